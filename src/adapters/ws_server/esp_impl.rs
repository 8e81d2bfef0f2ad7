//! ESP-IDF WebSocket server on the built-in `esp_http_server`.
//!
//! The httpd task invokes the handler for every socket event. Connects,
//! disconnects, and text frames are pushed onto the transport channels.
//! Outbound frames are drained by the control loop via
//! [`WsServer::pump_outbound`] and written through detached senders, so the
//! control loop never blocks on the httpd task.
//!
//! Every push happens under the slot lock, so the httpd task and the
//! control loop never race for the last free event slot.

use std::sync::{Arc, Mutex};

use esp_idf_svc::http::server::ws::EspHttpWsDetachedSender;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::ws::FrameType;
use esp_idf_sys::{ESP_FAIL, EspError};
use log::{info, warn};

use crate::session::{MAX_SESSIONS, SessionId};
use crate::transport::channels::TransportChannels;
use crate::transport::{MAX_INBOUND_LEN, TransportError, TransportEvent, inbound_text};

enum Slot {
    Free,
    /// httpd socket fd plus its detached sender.
    Open(i32, EspHttpWsDetachedSender),
    /// Socket gone, `Disconnected` not yet queued. Not reusable.
    Closing,
}

type SharedSlots = Arc<Mutex<[Slot; MAX_SESSIONS]>>;

/// Handler error that makes httpd close the socket.
fn refuse() -> EspError {
    EspError::from_infallible::<ESP_FAIL>()
}

/// Mark `id` gone and tell the control loop, or leave it `Closing` for
/// [`WsServer::pump_outbound`] to retry.
fn close_slot(slots: &mut [Slot; MAX_SESSIONS], channels: &TransportChannels, id: SessionId) {
    slots[id as usize] = match channels.push_lifecycle(TransportEvent::Disconnected(id)) {
        Ok(()) => Slot::Free,
        Err(_) => {
            warn!("WS(espidf): [{}] disconnect held, event queue full", id);
            Slot::Closing
        }
    };
}

pub struct WsServer {
    _server: EspHttpServer<'static>,
    slots: SharedSlots,
    channels: &'static TransportChannels,
}

impl WsServer {
    /// Start the HTTP server on `port` and register the `/` WebSocket route.
    pub fn start(port: u16, channels: &'static TransportChannels) -> Result<Self, TransportError> {
        let mut server = EspHttpServer::new(&Configuration {
            http_port: port,
            max_open_sockets: MAX_SESSIONS + 1,
            ..Default::default()
        })
        .map_err(|_| TransportError::Bind)?;

        let slots: SharedSlots = Arc::new(Mutex::new(core::array::from_fn(|_| Slot::Free)));
        let handler_slots = slots.clone();

        server
            .ws_handler("/", move |ws| -> Result<(), EspError> {
                let fd = ws.session();
                let Ok(mut slots) = handler_slots.lock() else {
                    return Err(refuse());
                };

                if ws.is_new() {
                    let Some(idx) = slots.iter().position(|s| matches!(s, Slot::Free)) else {
                        warn!("WS(espidf): socket {} refused, all slots busy", fd);
                        return Err(refuse());
                    };
                    if !channels.has_headroom() {
                        warn!("WS(espidf): socket {} refused, event queue busy", fd);
                        return Err(refuse());
                    }
                    let sender = ws.create_detached_sender()?;
                    if channels
                        .push_lifecycle(TransportEvent::Connected(idx as SessionId))
                        .is_err()
                    {
                        return Err(refuse());
                    }
                    slots[idx] = Slot::Open(fd, sender);
                    info!("WS(espidf): [{}] connected on socket {}", idx, fd);
                    return Ok(());
                }

                let Some(id) = slot_of(&slots, fd) else {
                    return Ok(());
                };

                if ws.is_closed() {
                    info!("WS(espidf): [{}] disconnected", id);
                    close_slot(&mut slots, channels, id);
                    return Ok(());
                }

                let (_, len) = ws.recv(&mut [])?;
                if len > MAX_INBOUND_LEN {
                    warn!("WS(espidf): [{}] dropped {}-byte frame", id, len);
                    return Ok(());
                }
                let mut buf = [0u8; MAX_INBOUND_LEN];
                let (frame_type, len) = ws.recv(&mut buf[..len])?;
                if !matches!(frame_type, FrameType::Text(_)) {
                    return Ok(());
                }
                let text = core::str::from_utf8(&buf[..len])
                    .ok()
                    .map(|s| s.trim_end_matches('\0'))
                    .and_then(inbound_text);
                if let Some(text) = text {
                    // Refused at the disconnect reserve; httpd cannot leave
                    // the frame unread, so it is dropped.
                    channels.push_text(id, text);
                }
                Ok(())
            })
            .map_err(|_| TransportError::Bind)?;

        info!("WS(espidf): listening on port {}", port);
        Ok(Self {
            _server: server,
            slots,
            channels,
        })
    }

    /// Write every queued outbound frame and retry held disconnects. Call
    /// once per control-loop pass.
    pub fn pump_outbound(&self) {
        let Ok(mut slots) = self.slots.lock() else {
            return;
        };

        for idx in 0..MAX_SESSIONS {
            if matches!(slots[idx], Slot::Closing) {
                close_slot(&mut slots, self.channels, idx as SessionId);
            }
        }

        while let Some(msg) = self.channels.try_recv_outbound() {
            let Some(Slot::Open(_, sender)) = slots.get_mut(msg.session as usize) else {
                continue;
            };
            if let Err(e) = sender.send(FrameType::Text(false), msg.payload.as_bytes()) {
                warn!("WS(espidf): write to [{}] failed: {}", msg.session, e);
                close_slot(&mut slots, self.channels, msg.session);
            }
        }
    }
}

fn slot_of(slots: &[Slot; MAX_SESSIONS], fd: i32) -> Option<SessionId> {
    slots
        .iter()
        .position(|s| matches!(s, Slot::Open(sock, _) if *sock == fd))
        .map(|idx| idx as SessionId)
}
