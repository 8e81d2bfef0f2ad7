//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART on the device, the tracing subscriber on the host).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { ws_port } => {
                info!("START | ws_port={}", ws_port);
            }
            AppEvent::SessionOpened { session, active } => {
                info!("SESSION | [{}] opened, active={}", session, active);
            }
            AppEvent::SessionClosed { session, active } => {
                info!("SESSION | [{}] closed, active={}", session, active);
            }
            AppEvent::SessionRejected { session } => {
                warn!("SESSION | [{}] rejected, registry full", session);
            }
            AppEvent::CommandIgnored { session } => {
                info!("CMD | [{}] unrecognised message ignored", session);
            }
            AppEvent::AlertStarted { kind, by } => {
                info!("ALERT | {} started by [{}]", kind.name(), by);
            }
            AppEvent::AlertRejected { requested, active } => {
                warn!(
                    "ALERT | {:?} rejected, {} still playing",
                    requested,
                    active.name()
                );
            }
            AppEvent::AlertCompleted { kind, delivered } => {
                info!(
                    "ALERT | {} complete, notice sent to {} client(s)",
                    kind.name(),
                    delivered
                );
            }
            AppEvent::BroadcastSent { status, delivered } => {
                log::debug!("DATA | status={:?} -> {} client(s)", status, delivered);
            }
        }
    }
}
