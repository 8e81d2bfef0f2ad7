//! Non-blocking alert sequencer.
//!
//! Plays one [`AlertPattern`] at a time on the local outputs:
//!
//! ```text
//!              start()                poll(): hold elapsed
//!   ┌──────┐ ─────────▶ ┌────────────┐ ───────────────────▶ ┌───────────┐
//!   │ Idle │            │ step N     │                      │ step N    │
//!   │      │            │ Hold (HIGH)│ ◀─────────────────── │ Gap (LOW) │
//!   └──────┘ ◀───────── └────────────┘  gap elapsed, N+1    └───────────┘
//!        last gap elapsed → Some(kind)
//! ```
//!
//! The sequencer never sleeps. The control loop calls [`AlertSequencer::poll`]
//! every tick with the current uptime; phase boundaries are computed from
//! the previous boundary, so a late poll catches up without drifting the
//! rest of the pattern.

pub mod patterns;

use log::{info, warn};

use crate::app::ports::OutputPort;

pub use patterns::{AlertPattern, AlertStep, OutputMask};

/// Which alert pattern to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    /// Red LED + buzzer flashing, triggered by `emergency`.
    Emergency,
    /// Buzzer-only short/long/short signal, triggered by `sos`.
    Distress,
}

impl AlertKind {
    pub fn pattern(self) -> &'static AlertPattern {
        match self {
            Self::Emergency => &patterns::EMERGENCY,
            Self::Distress => &patterns::DISTRESS,
        }
    }

    /// Notice broadcast to every session once the pattern completes.
    pub fn notice(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY_MANUAL_TRIGGER",
            Self::Distress => "SOS_SIGNAL_SENT",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Distress => "distress",
        }
    }
}

/// Half of an [`AlertStep`] currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Outputs HIGH for `hold_ms`.
    Hold,
    /// Outputs LOW for `gap_ms`.
    Gap,
}

/// Sequencer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running {
        kind: AlertKind,
        step: usize,
        phase: Phase,
        phase_started_ms: u64,
    },
}

/// Drives at most one alert pattern at a time.
#[derive(Debug)]
pub struct AlertSequencer {
    state: SequencerState,
    completed: u32,
}

impl Default for AlertSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSequencer {
    pub const fn new() -> Self {
        Self {
            state: SequencerState::Idle,
            completed: 0,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SequencerState::Running { .. })
    }

    /// The pattern currently playing, if any.
    pub fn active(&self) -> Option<AlertKind> {
        match self.state {
            SequencerState::Running { kind, .. } => Some(kind),
            SequencerState::Idle => None,
        }
    }

    /// Number of patterns played to completion since boot.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Begin playing `kind`. Returns `false` (and changes nothing) if a
    /// pattern is already running.
    pub fn start(&mut self, kind: AlertKind, now_ms: u64, out: &mut impl OutputPort) -> bool {
        if let Some(active) = self.active() {
            warn!(
                "alert {} rejected: {} still playing",
                kind.name(),
                active.name()
            );
            return false;
        }
        let Some(first) = kind.pattern().steps.first() else {
            return false;
        };

        out.set_outputs(first.outputs, true);
        self.state = SequencerState::Running {
            kind,
            step: 0,
            phase: Phase::Hold,
            phase_started_ms: now_ms,
        };
        info!(
            "alert {} started ({} ms)",
            kind.name(),
            kind.pattern().total_duration_ms()
        );
        true
    }

    /// Advance the pattern to `now_ms`.
    ///
    /// Returns `Some(kind)` exactly once, on the poll where the pattern
    /// finishes; the sequencer is `Idle` afterwards.
    pub fn poll(&mut self, now_ms: u64, out: &mut impl OutputPort) -> Option<AlertKind> {
        loop {
            let SequencerState::Running {
                kind,
                step,
                phase,
                phase_started_ms,
            } = self.state
            else {
                return None;
            };

            let steps = kind.pattern().steps;
            let Some(current) = steps.get(step) else {
                self.state = SequencerState::Idle;
                return None;
            };

            let duration = match phase {
                Phase::Hold => current.hold_ms,
                Phase::Gap => current.gap_ms,
            };
            let boundary = phase_started_ms + u64::from(duration);
            if now_ms < boundary {
                return None;
            }

            match phase {
                Phase::Hold => {
                    out.set_outputs(current.outputs, false);
                    self.state = SequencerState::Running {
                        kind,
                        step,
                        phase: Phase::Gap,
                        phase_started_ms: boundary,
                    };
                }
                Phase::Gap => match steps.get(step + 1) {
                    Some(next) => {
                        out.set_outputs(next.outputs, true);
                        self.state = SequencerState::Running {
                            kind,
                            step: step + 1,
                            phase: Phase::Hold,
                            phase_started_ms: boundary,
                        };
                    }
                    None => {
                        self.state = SequencerState::Idle;
                        self.completed = self.completed.wrapping_add(1);
                        info!("alert {} complete", kind.name());
                        return Some(kind);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pins {
        level: OutputMask,
        writes: Vec<(OutputMask, bool)>,
    }

    impl OutputPort for Pins {
        fn set_outputs(&mut self, mask: OutputMask, on: bool) {
            self.level = if on {
                self.level.union(mask)
            } else {
                self.level.without(mask)
            };
            self.writes.push((mask, on));
        }

        fn outputs(&self) -> OutputMask {
            self.level
        }
    }

    #[test]
    fn start_asserts_first_step() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        assert!(seq.start(AlertKind::Emergency, 0, &mut pins));
        assert_eq!(pins.level, OutputMask::RED | OutputMask::BUZZER);
        assert_eq!(seq.active(), Some(AlertKind::Emergency));
    }

    #[test]
    fn second_start_is_rejected_while_running() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        assert!(seq.start(AlertKind::Emergency, 0, &mut pins));
        let before = pins.writes.len();
        assert!(!seq.start(AlertKind::Distress, 50, &mut pins));
        assert_eq!(pins.writes.len(), before);
        assert_eq!(seq.active(), Some(AlertKind::Emergency));
    }

    #[test]
    fn emergency_toggles_on_200ms_boundaries() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        seq.start(AlertKind::Emergency, 1_000, &mut pins);

        assert_eq!(seq.poll(1_199, &mut pins), None);
        assert!(pins.level.contains(OutputMask::RED));
        assert_eq!(seq.poll(1_200, &mut pins), None);
        assert!(pins.level.is_empty());
        assert_eq!(seq.poll(1_400, &mut pins), None);
        assert!(pins.level.contains(OutputMask::BUZZER));
    }

    #[test]
    fn emergency_completes_after_full_duration() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        seq.start(AlertKind::Emergency, 0, &mut pins);

        let mut t = 0;
        while t < 2_000 {
            assert_eq!(seq.poll(t, &mut pins), None);
            t += 100;
        }
        assert_eq!(seq.poll(2_000, &mut pins), Some(AlertKind::Emergency));
        assert!(!seq.is_running());
        assert!(pins.level.is_empty());
        assert_eq!(seq.completed(), 1);
        // Completion is reported once.
        assert_eq!(seq.poll(2_100, &mut pins), None);
    }

    #[test]
    fn late_poll_catches_up_without_drift() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        seq.start(AlertKind::Distress, 0, &mut pins);
        // Skip well past the first group; boundaries stay anchored at t=0.
        assert_eq!(seq.poll(1_300, &mut pins), None);
        match seq.state() {
            SequencerState::Running {
                step,
                phase,
                phase_started_ms,
                ..
            } => {
                // Third dot's trailing pause: 800 ms hold start + 200 ms.
                assert_eq!(step, 2);
                assert_eq!(phase, Phase::Gap);
                assert_eq!(phase_started_ms, 1_000);
            }
            SequencerState::Idle => panic!("sequencer should still be running"),
        }
        assert_eq!(seq.poll(5_300, &mut pins), Some(AlertKind::Distress));
    }

    #[test]
    fn distress_never_touches_leds() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        seq.start(AlertKind::Distress, 0, &mut pins);
        let mut t = 0;
        while seq.poll(t, &mut pins).is_none() {
            t += 100;
        }
        assert!(
            pins.writes
                .iter()
                .all(|(mask, _)| *mask == OutputMask::BUZZER)
        );
    }

    #[test]
    fn restart_allowed_after_completion() {
        let mut seq = AlertSequencer::new();
        let mut pins = Pins::default();
        seq.start(AlertKind::Distress, 0, &mut pins);
        assert_eq!(seq.poll(10_000, &mut pins), Some(AlertKind::Distress));
        assert!(seq.start(AlertKind::Emergency, 10_000, &mut pins));
    }

    #[test]
    fn notices_match_wire_strings() {
        assert_eq!(AlertKind::Emergency.notice(), "EMERGENCY_MANUAL_TRIGGER");
        assert_eq!(AlertKind::Distress.notice(), "SOS_SIGNAL_SENT");
    }
}
