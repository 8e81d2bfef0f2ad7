//! Mock adapters for integration tests.
//!
//! Records every output call, outbound frame, and application event so
//! tests can assert on the full history without real GPIO or sockets.

use aegis::alert::OutputMask;
use aegis::app::events::AppEvent;
use aegis::app::ports::{EventSink, OutputPort, SensorPort, TransportPort};
use aegis::app::snapshot::{Posture, SensorReadings};
use aegis::session::SessionId;
use aegis::transport::TransportError;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCall {
    pub mask: OutputMask,
    pub on: bool,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub readings: SensorReadings,
    pub reads: u32,
    pub calls: Vec<OutputCall>,
    level: OutputMask,
}

pub fn calm_readings() -> SensorReadings {
    SensorReadings {
        heart_rate: 72,
        temperature_c: 25.0,
        gas_level: 400,
        posture: Posture::Standing,
        fall_detected: false,
        flame_detected: false,
    }
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            readings: calm_readings(),
            reads: 0,
            calls: Vec::new(),
            level: OutputMask::NONE,
        }
    }

    /// Output calls recorded since index `from`.
    pub fn calls_since(&self, from: usize) -> &[OutputCall] {
        &self.calls[from..]
    }

    /// Whether any call since `from` touched `mask`.
    pub fn touched_since(&self, from: usize, mask: OutputMask) -> bool {
        self.calls[from..].iter().any(|c| c.mask.intersects(mask))
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorReadings {
        self.reads += 1;
        self.readings
    }
}

impl OutputPort for MockHardware {
    fn set_outputs(&mut self, mask: OutputMask, on: bool) {
        self.calls.push(OutputCall { mask, on });
        self.level = if on {
            self.level.union(mask)
        } else {
            self.level.without(mask)
        };
    }

    fn outputs(&self) -> OutputMask {
        self.level
    }
}

// ── RecordingTransport ────────────────────────────────────────

/// Captures every outbound frame. Sessions listed in `failing` reject sends.
pub struct RecordingTransport {
    pub sent: Vec<(SessionId, String)>,
    pub failing: Vec<SessionId>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            failing: Vec::new(),
        }
    }

    /// Frames delivered to `id`, in order.
    pub fn frames_for(&self, id: SessionId) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(s, _)| *s == id)
            .map(|(_, p)| p.as_str())
            .collect()
    }

    /// Number of frames whose payload equals `payload`.
    pub fn count_payload(&self, payload: &str) -> usize {
        self.sent.iter().filter(|(_, p)| p == payload).count()
    }

    /// Frames carrying a sensor snapshot.
    pub fn snapshots(&self) -> Vec<(SessionId, serde_json::Value)> {
        self.sent
            .iter()
            .filter_map(|(s, p)| {
                let v: serde_json::Value = serde_json::from_str(p).ok()?;
                v.get("heartRate")?;
                Some((*s, v))
            })
            .collect()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportPort for RecordingTransport {
    fn send_text(&mut self, session: SessionId, payload: &str) -> Result<(), TransportError> {
        if self.failing.contains(&session) {
            return Err(TransportError::Io);
        }
        self.sent.push((session, payload.to_owned()));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
