//! Inter-task channels between the transport and the control loop.
//!
//! Uses `embassy-sync` bounded MPMC channels so the I/O side and the
//! synchronous control loop share fixed-size queues without heap
//! allocation. The firmware uses the single static [`CHANNELS`]; tests
//! build their own [`TransportChannels`] instance.
//!
//! Connects, disconnects and text frames share one queue so the control
//! loop sees them in arrival order. Text frames and new connections are
//! only admitted while more than [`LIFECYCLE_RESERVE`] slots are free, so
//! every open session can always report its disconnect.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::{InboundText, MAX_OUTBOUND_LEN, TransportEvent};
use crate::session::{MAX_SESSIONS, SessionId};

/// Outbound text frame from the control loop, delivered to the I/O side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMsg {
    /// Which session this frame is destined for.
    pub session: SessionId,
    pub payload: heapless::String<MAX_OUTBOUND_LEN>,
}

/// Channel depth for inbound events.
const EVENT_DEPTH: usize = 16;

/// Event slots held back for `Disconnected`, one per session.
pub const LIFECYCLE_RESERVE: usize = MAX_SESSIONS;

/// Channel depth for outbound frames. A broadcast to every session plus an
/// alert notice must fit between two I/O passes.
const OUTBOUND_DEPTH: usize = 32;

/// Both directions of the transport ↔ control-loop bridge.
pub struct TransportChannels {
    /// Inbound: transport → control loop.
    pub events: Channel<CriticalSectionRawMutex, TransportEvent, EVENT_DEPTH>,
    /// Outbound: control loop → transport.
    pub outbound: Channel<CriticalSectionRawMutex, OutboundMsg, OUTBOUND_DEPTH>,
}

impl Default for TransportChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportChannels {
    pub const fn new() -> Self {
        Self {
            events: Channel::new(),
            outbound: Channel::new(),
        }
    }

    /// True while a text frame or a new connection may be queued without
    /// eating into the disconnect reserve.
    pub fn has_headroom(&self) -> bool {
        self.events.free_capacity() > LIFECYCLE_RESERVE
    }

    /// Queue a text frame. Refused (and dropped) once the queue is down to
    /// its disconnect reserve; readers should check [`Self::has_headroom`]
    /// first and leave unread frames in the socket.
    pub fn push_text(&self, session: SessionId, text: InboundText) -> bool {
        if !self.has_headroom() {
            warn!("transport: event queue at reserve, dropping text from [{}]", session);
            return false;
        }
        self.events.try_send(TransportEvent::Text(session, text)).is_ok()
    }

    /// Queue a `Connected`/`Disconnected` event. Hands the event back when
    /// the queue is full so the caller can hold it and retry.
    pub fn push_lifecycle(&self, event: TransportEvent) -> Result<(), TransportEvent> {
        debug_assert!(!matches!(event, TransportEvent::Text(..)));
        self.events.try_send(event).map_err(|e| match e {
            embassy_sync::channel::TrySendError::Full(event) => event,
        })
    }

    /// Try to receive one inbound event.
    pub fn try_recv_event(&self) -> Option<TransportEvent> {
        self.events.try_receive().ok()
    }

    /// Feed every pending inbound event to `handler`, in arrival order.
    pub fn drain_events(&self, mut handler: impl FnMut(TransportEvent)) -> usize {
        let mut n = 0;
        while let Some(event) = self.try_recv_event() {
            handler(event);
            n += 1;
        }
        n
    }

    /// Try to receive one outbound frame.
    pub fn try_recv_outbound(&self) -> Option<OutboundMsg> {
        self.outbound.try_receive().ok()
    }
}

/// The firmware's transport channels.
pub static CHANNELS: TransportChannels = TransportChannels::new();
