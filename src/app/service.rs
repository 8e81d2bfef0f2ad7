//! Application service, the hexagonal core.
//!
//! [`MonitorService`] owns the session registry, alert sequencer, and
//! broadcast scheduler. All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  TransportEvent ──▶ ┌──────────────────────────────┐ ──▶ TransportPort
//!                     │        MonitorService        │
//!      SensorPort ──▶ │ Sessions · Alerts · Broadcast│ ──▶ EventSink
//!                     └──────────────────────────────┘
//!                                    │
//!                                    ▼
//!                               OutputPort
//! ```

use log::{debug, info, warn};

use crate::alert::AlertSequencer;
use crate::broadcast::{BroadcastOutcome, BroadcastScheduler};
use crate::config::SystemConfig;
use crate::session::{SessionId, SessionRegistry};
use crate::transport::TransportEvent;

use super::commands::Command;
use super::events::AppEvent;
use super::ports::{EventSink, OutputPort, SensorPort, TransportPort};
use super::wire::Outbound;

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    config: SystemConfig,
    sessions: SessionRegistry,
    sequencer: AlertSequencer,
    scheduler: BroadcastScheduler,
}

impl MonitorService {
    pub fn new(config: SystemConfig) -> Self {
        let scheduler = BroadcastScheduler::new(&config);
        Self {
            config,
            sessions: SessionRegistry::new(),
            sequencer: AlertSequencer::new(),
            scheduler,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            ws_port: self.config.ws_port,
        });
        info!("MonitorService started on port {}", self.config.ws_port);
    }

    // ── Transport events ──────────────────────────────────────

    /// Apply one event handed over by the transport.
    pub fn handle_transport_event(
        &mut self,
        event: TransportEvent,
        now_ms: u64,
        hw: &mut impl OutputPort,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        match event {
            TransportEvent::Connected(id) => self.on_connect(id, transport, sink),
            TransportEvent::Disconnected(id) => self.on_disconnect(id, sink),
            TransportEvent::Text(id, text) => {
                self.handle_message(id, &text, now_ms, hw, transport, sink)
            }
        }
    }

    pub fn on_connect(
        &mut self,
        id: SessionId,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        if self.sessions.contains(id) {
            debug!("duplicate connect for session {}", id);
            return;
        }
        if !self.sessions.on_connect(id) {
            sink.emit(&AppEvent::SessionRejected { session: id });
            return;
        }
        send_to(id, Outbound::Connected, transport);
        sink.emit(&AppEvent::SessionOpened {
            session: id,
            active: self.sessions.active_count(),
        });
    }

    pub fn on_disconnect(&mut self, id: SessionId, sink: &mut impl EventSink) {
        if self.sessions.on_disconnect(id) {
            sink.emit(&AppEvent::SessionClosed {
                session: id,
                active: self.sessions.active_count(),
            });
        }
    }

    /// Route one inbound text message.
    ///
    /// A recognised command always gets its acknowledgement, even when the
    /// alert could not start because another one is playing.
    pub fn handle_message(
        &mut self,
        id: SessionId,
        text: &str,
        now_ms: u64,
        hw: &mut impl OutputPort,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        if !self.sessions.contains(id) {
            debug!("message from unregistered session {} dropped", id);
            return;
        }
        let Some(cmd) = Command::parse(text) else {
            debug!("session {}: no command in {:?}", id, text);
            sink.emit(&AppEvent::CommandIgnored { session: id });
            return;
        };

        let kind = cmd.alert();
        if self.sequencer.start(kind, now_ms, hw) {
            sink.emit(&AppEvent::AlertStarted { kind, by: id });
        } else if let Some(active) = self.sequencer.active() {
            sink.emit(&AppEvent::AlertRejected {
                requested: cmd,
                active,
            });
        }

        send_to(id, Outbound::Ack(cmd), transport);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: advance any alert, then the broadcast timer.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + OutputPort),
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) -> BroadcastOutcome {
        // 1. Alert step machine
        if let Some(kind) = self.sequencer.poll(now_ms, hw) {
            let delivered = match Outbound::AlertNotice(kind).encode() {
                Ok(payload) => self.sessions.broadcast(&payload, transport),
                Err(e) => {
                    warn!("alert notice encode failed: {}", e);
                    0
                }
            };
            sink.emit(&AppEvent::AlertCompleted { kind, delivered });
            self.scheduler.restore_indicators(hw);
        }

        // 2. Sensor broadcast
        let outcome = self.scheduler.tick(
            now_ms,
            hw,
            &mut self.sessions,
            transport,
            self.sequencer.is_running(),
        );
        if let BroadcastOutcome::Sent {
            snapshot,
            delivered,
        } = outcome
        {
            sink.emit(&AppEvent::BroadcastSent {
                status: snapshot.status(),
                delivered,
            });
        }
        outcome
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn sequencer(&self) -> &AlertSequencer {
        &self.sequencer
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}

/// Encode and queue a frame for one session. Failures are logged only.
fn send_to(id: SessionId, frame: Outbound<'_>, transport: &mut impl TransportPort) {
    let payload = match frame.encode() {
        Ok(p) => p,
        Err(e) => {
            warn!("frame encode failed: {}", e);
            return;
        }
    };
    if let Err(e) = transport.send_text(id, &payload) {
        warn!("send to session {} failed: {}", id, e);
    }
}
