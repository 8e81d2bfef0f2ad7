//! Inbound commands carried in session text messages.
//!
//! A message is matched against an ordered keyword table: the first
//! keyword that occurs anywhere in the text (case-sensitive) selects the
//! command. Text matching no keyword is ignored.

use crate::alert::AlertKind;

/// Commands a session can send to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Play the emergency pattern.
    Emergency,
    /// Play the distress (SOS) pattern.
    Sos,
}

/// Match order matters: `"emergency"` wins over `"sos"` when a message
/// contains both.
const KEYWORDS: [(&str, Command); 2] = [
    ("emergency", Command::Emergency),
    ("sos", Command::Sos),
];

impl Command {
    /// Extract a command from free-form message text.
    pub fn parse(text: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|&(_, cmd)| cmd)
    }

    /// Alert pattern this command triggers.
    pub fn alert(self) -> AlertKind {
        match self {
            Self::Emergency => AlertKind::Emergency,
            Self::Sos => AlertKind::Distress,
        }
    }

    /// `action` value of the acknowledgement sent to the requester.
    pub fn ack_action(self) -> &'static str {
        match self {
            Self::Emergency => "emergency_activated",
            Self::Sos => "sos_activated",
        }
    }
}
