//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them (log to serial, count in tests).

use crate::alert::AlertKind;
use crate::session::SessionId;

use super::commands::Command;
use super::snapshot::Status;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started and is accepting sessions.
    Started { ws_port: u16 },

    /// A session joined. `active` is the count after joining.
    SessionOpened { session: SessionId, active: usize },

    /// A session left. `active` is the count after leaving.
    SessionClosed { session: SessionId, active: usize },

    /// A connection was refused because every slot is taken.
    SessionRejected { session: SessionId },

    /// A text message matched no command keyword.
    CommandIgnored { session: SessionId },

    /// A command started an alert pattern.
    AlertStarted { kind: AlertKind, by: SessionId },

    /// A command arrived while another pattern was still playing.
    AlertRejected {
        requested: Command,
        active: AlertKind,
    },

    /// A pattern finished and its notice went out.
    AlertCompleted { kind: AlertKind, delivered: usize },

    /// A sensor snapshot was broadcast.
    BroadcastSent { status: Status, delivered: usize },
}
