//! WebSocket server adapter.
//!
//! Accepts up to [`MAX_SESSIONS`] concurrent clients on
//! `0.0.0.0:<ws_port>`. Each client occupies a slot; the slot index is the
//! client's [`SessionId`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: the ESP-IDF HTTP server's WebSocket
//!   handler (see `esp_impl`). Socket callbacks push
//!   [`TransportEvent`](crate::transport::TransportEvent)s straight onto
//!   the transport channels; outbound frames go through detached senders.
//! - **all other targets**: a non-blocking `std::net::TcpListener` with
//!   `tungstenite` framing, driven by
//!   [`transport::io_task`](crate::transport::io_task).

#[cfg(target_os = "espidf")]
mod esp_impl;
#[cfg(target_os = "espidf")]
pub use esp_impl::WsServer;

#[cfg(not(target_os = "espidf"))]
pub use host::{ReadOutcome, WsServer};

#[cfg(not(target_os = "espidf"))]
mod host {
    use core::time::Duration;
    use std::io::ErrorKind;
    use std::net::{SocketAddr, TcpListener, TcpStream};

    use log::{info, warn};
    use tungstenite::{Message, WebSocket};

    use crate::session::{MAX_SESSIONS, SessionId};
    use crate::transport::{InboundText, TransportError, inbound_text};

    /// Upper bound on a client's opening handshake.
    const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

    struct WsClient {
        socket: WebSocket<TcpStream>,
        peer: SocketAddr,
    }

    /// Result of one non-blocking read attempt.
    #[derive(Debug, PartialEq, Eq)]
    pub enum ReadOutcome {
        /// Nothing buffered.
        Idle,
        /// A complete text frame.
        Text(InboundText),
        /// A control, binary, or oversized frame was consumed and dropped.
        Ignored,
        /// The peer closed or the socket failed.
        Closed,
    }

    /// Host WebSocket listener with fixed client slots.
    pub struct WsServer {
        listener: TcpListener,
        slots: [Option<WsClient>; MAX_SESSIONS],
    }

    impl WsServer {
        /// Bind a non-blocking listener on `0.0.0.0:<port>`. Port 0 picks a
        /// free port (see [`local_addr`](Self::local_addr)).
        pub fn bind(port: u16) -> Result<Self, TransportError> {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = TcpListener::bind(addr).map_err(|_| TransportError::Bind)?;
            listener
                .set_nonblocking(true)
                .map_err(|_| TransportError::Bind)?;
            info!("WS: listening on {}", addr);
            Ok(Self {
                listener,
                slots: core::array::from_fn(|_| None),
            })
        }

        pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
            self.listener.local_addr().map_err(|_| TransportError::Io)
        }

        pub fn is_connected(&self, id: SessionId) -> bool {
            matches!(self.slots.get(id as usize), Some(Some(_)))
        }

        pub fn connected_count(&self) -> usize {
            self.slots.iter().filter(|s| s.is_some()).count()
        }

        /// Accept and handshake one pending connection, if any.
        pub fn try_accept(&mut self) -> Option<SessionId> {
            let (stream, peer) = match self.listener.accept() {
                Ok(pair) => pair,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => return None,
                Err(e) => {
                    warn!("WS: accept error: {}", e);
                    return None;
                }
            };

            let Some(idx) = self.slots.iter().position(Option::is_none) else {
                warn!("WS: refusing {}: all {} slots busy", peer, MAX_SESSIONS);
                return None;
            };

            match handshake(stream) {
                Ok(socket) => {
                    info!("WS: [{}] connected from {}", idx, peer);
                    self.slots[idx] = Some(WsClient { socket, peer });
                    Some(idx as SessionId)
                }
                Err(e) => {
                    warn!("WS: {} from {}", e, peer);
                    None
                }
            }
        }

        /// Read at most one frame from session `id` without blocking.
        pub fn poll_read(&mut self, id: SessionId) -> ReadOutcome {
            let Some(client) = self.slot_mut(id) else {
                return ReadOutcome::Closed;
            };
            match client.socket.read() {
                Ok(Message::Text(text)) => match inbound_text(text.as_str()) {
                    Some(t) => ReadOutcome::Text(t),
                    None => {
                        warn!("WS: [{}] dropped {}-byte frame", id, text.len());
                        ReadOutcome::Ignored
                    }
                },
                Ok(Message::Close(_)) => ReadOutcome::Closed,
                Ok(_) => ReadOutcome::Ignored,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                    ReadOutcome::Idle
                }
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    ReadOutcome::Closed
                }
                Err(e) => {
                    warn!("WS: [{}] read error: {}", id, e);
                    ReadOutcome::Closed
                }
            }
        }

        /// Queue a text frame. Bytes the socket cannot take yet stay
        /// buffered until the next [`flush`](Self::flush).
        pub fn send(&mut self, id: SessionId, payload: &str) -> Result<(), TransportError> {
            let client = self.slot_mut(id).ok_or(TransportError::NotConnected)?;
            match client.socket.send(Message::text(payload.to_owned())) {
                Ok(()) => Ok(()),
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
                Err(_) => Err(TransportError::Io),
            }
        }

        /// Push any buffered outbound bytes (including automatic pong replies).
        pub fn flush(&mut self, id: SessionId) -> Result<(), TransportError> {
            let client = self.slot_mut(id).ok_or(TransportError::NotConnected)?;
            match client.socket.flush() {
                Ok(()) => Ok(()),
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => Ok(()),
                Err(_) => Err(TransportError::Io),
            }
        }

        /// Close and free the slot for `id`.
        pub fn disconnect(&mut self, id: SessionId) {
            if let Some(slot) = self.slots.get_mut(id as usize) {
                if let Some(mut client) = slot.take() {
                    let _ = client.socket.close(None);
                    let _ = client.socket.flush();
                    info!("WS: [{}] disconnected ({})", id, client.peer);
                }
            }
        }

        fn slot_mut(&mut self, id: SessionId) -> Option<&mut WsClient> {
            self.slots.get_mut(id as usize).and_then(Option::as_mut)
        }
    }

    /// Run the opening handshake in blocking mode, then switch the socket
    /// to non-blocking for the session's lifetime.
    fn handshake(stream: TcpStream) -> Result<WebSocket<TcpStream>, TransportError> {
        stream
            .set_nonblocking(false)
            .map_err(|_| TransportError::Io)?;
        stream
            .set_read_timeout(Some(HANDSHAKE_TIMEOUT))
            .map_err(|_| TransportError::Io)?;

        let socket = tungstenite::accept(stream).map_err(|_| TransportError::Handshake)?;

        socket
            .get_ref()
            .set_read_timeout(None)
            .map_err(|_| TransportError::Io)?;
        socket
            .get_ref()
            .set_nonblocking(true)
            .map_err(|_| TransportError::Io)?;
        Ok(socket)
    }

}
