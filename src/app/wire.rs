//! JSON text frames sent to sessions.
//!
//! Every outbound frame is one of the [`Outbound`] variants. The encoding
//! is a thin serde layer; field names are part of the client contract.

use serde::Serialize;

use crate::alert::AlertKind;

use super::commands::Command;
use super::snapshot::SensorSnapshot;

#[derive(Serialize)]
struct StatusFrame {
    status: &'static str,
}

#[derive(Serialize)]
struct ActionFrame {
    action: &'static str,
}

#[derive(Serialize)]
struct AlertFrame {
    alert: &'static str,
}

/// A frame addressed to one or all sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outbound<'a> {
    /// `{"status":"connected"}`, the greeting to a new session.
    Connected,
    /// `{"action":"..."}`, the acknowledgement to a command's sender.
    Ack(Command),
    /// `{"alert":"..."}`, broadcast when a pattern completes.
    AlertNotice(AlertKind),
    /// Periodic sensor snapshot.
    Snapshot(&'a SensorSnapshot),
}

impl Outbound<'_> {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match *self {
            Self::Connected => serde_json::to_string(&StatusFrame {
                status: "connected",
            }),
            Self::Ack(cmd) => serde_json::to_string(&ActionFrame {
                action: cmd.ack_action(),
            }),
            Self::AlertNotice(kind) => serde_json::to_string(&AlertFrame {
                alert: kind.notice(),
            }),
            Self::Snapshot(snap) => serde_json::to_string(snap),
        }
    }
}
