//! [`TransportPort`] implementation that queues frames on the outbound channel.

use log::debug;

use super::channels::{OutboundMsg, TransportChannels};
use super::TransportError;
use crate::app::ports::TransportPort;
use crate::session::SessionId;

/// Control-loop side of the transport: every `send_text` becomes an
/// [`OutboundMsg`] for the I/O task.
pub struct ChannelTransport<'a> {
    channels: &'a TransportChannels,
}

impl<'a> ChannelTransport<'a> {
    pub fn new(channels: &'a TransportChannels) -> Self {
        Self { channels }
    }
}

impl TransportPort for ChannelTransport<'_> {
    fn send_text(&mut self, session: SessionId, payload: &str) -> Result<(), TransportError> {
        let mut msg = OutboundMsg {
            session,
            payload: heapless::String::new(),
        };
        msg.payload
            .push_str(payload)
            .map_err(|_| TransportError::PayloadTooLarge)?;
        self.channels
            .outbound
            .try_send(msg)
            .map_err(|_| TransportError::ChannelFull)?;
        debug!("queued {} bytes for session {}", payload.len(), session);
        Ok(())
    }
}
