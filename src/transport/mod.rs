//! Transport boundary between the WebSocket server and the control loop.
//!
//! The server (host I/O thread or ESP-IDF httpd task) turns socket
//! activity into [`TransportEvent`]s and pushes them onto
//! [`channels::TransportChannels`]. The control loop drains them one at a
//! time and replies through [`bridge::ChannelTransport`].
//!
//! ```text
//!  ┌──────────────┐  TransportEvent  ┌──────────────┐
//!  │  WS server   │ ───────────────▶ │ Control loop │
//!  │ (I/O thread) │ ◀─────────────── │  (sync)      │
//!  └──────────────┘   OutboundMsg    └──────────────┘
//! ```

pub mod bridge;
pub mod channels;
#[cfg(not(target_os = "espidf"))]
pub mod io_task;

use core::fmt;

use crate::session::SessionId;

/// Longest inbound text frame accepted from a session (bytes).
pub const MAX_INBOUND_LEN: usize = 256;

/// Longest outbound text frame (bytes).
pub const MAX_OUTBOUND_LEN: usize = 512;

/// Inbound text frame payload.
pub type InboundText = heapless::String<MAX_INBOUND_LEN>;

/// Socket activity reported to the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected(SessionId),
    Disconnected(SessionId),
    Text(SessionId, InboundText),
}

/// Errors originating from the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Could not bind or start the listener.
    Bind,
    /// Socket I/O failure.
    Io,
    /// WebSocket handshake failed.
    Handshake,
    /// The addressed session has no open socket.
    NotConnected,
    /// Frame exceeds the fixed channel buffer.
    PayloadTooLarge,
    /// Channel to the I/O side is full; frame dropped.
    ChannelFull,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind => write!(f, "listener bind failed"),
            Self::Io => write!(f, "socket I/O error"),
            Self::Handshake => write!(f, "WebSocket handshake failed"),
            Self::NotConnected => write!(f, "session not connected"),
            Self::PayloadTooLarge => write!(f, "payload exceeds frame buffer"),
            Self::ChannelFull => write!(f, "outbound channel full"),
        }
    }
}

/// Copy `text` into a fixed inbound buffer. Returns `None` if it does not fit.
pub fn inbound_text(text: &str) -> Option<InboundText> {
    let mut buf = InboundText::new();
    buf.push_str(text).ok()?;
    Some(buf)
}
