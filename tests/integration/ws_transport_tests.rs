//! Host WebSocket round-trip through the I/O thread and channels.
//!
//! A real tungstenite client talks to the listener on localhost; the test
//! body plays the control loop.

use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::mock_hw::{MockHardware, RecordingSink};

use aegis::adapters::ws_server::WsServer;
use aegis::app::service::MonitorService;
use aegis::config::SystemConfig;
use aegis::transport::TransportEvent;
use aegis::transport::bridge::ChannelTransport;
use aegis::transport::channels::TransportChannels;

const WAIT: Duration = Duration::from_secs(3);

fn leaked_channels() -> &'static TransportChannels {
    Box::leak(Box::new(TransportChannels::new()))
}

fn wait_event(channels: &TransportChannels) -> TransportEvent {
    let deadline = Instant::now() + WAIT;
    loop {
        if let Some(ev) = channels.try_recv_event() {
            return ev;
        }
        assert!(Instant::now() < deadline, "no transport event within {WAIT:?}");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn client(addr: SocketAddr) -> WebSocket<MaybeTlsStream<TcpStream>> {
    let url = format!("ws://127.0.0.1:{}/", addr.port());
    let (mut socket, _) = tungstenite::connect(url).unwrap();
    if let MaybeTlsStream::Plain(stream) = socket.get_mut() {
        stream.set_read_timeout(Some(WAIT)).unwrap();
    }
    socket
}

fn read_text(socket: &mut WebSocket<MaybeTlsStream<TcpStream>>) -> String {
    loop {
        match socket.read().unwrap() {
            Message::Text(t) => return t.as_str().to_owned(),
            Message::Ping(_) | Message::Pong(_) => {}
            other => panic!("unexpected frame {other:?}"),
        }
    }
}

#[test]
fn connect_command_and_disconnect_over_localhost() {
    let server = WsServer::bind(0).unwrap();
    let addr = server.local_addr().unwrap();
    let channels = leaked_channels();
    let _io = aegis::transport::io_task::spawn(server, channels).unwrap();

    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut transport = ChannelTransport::new(channels);
    let mut service = MonitorService::new(SystemConfig::default());

    let mut ws = client(addr);

    let ev = wait_event(channels);
    assert_eq!(ev, TransportEvent::Connected(0));
    service.handle_transport_event(ev, 0, &mut hw, &mut transport, &mut sink);
    assert_eq!(read_text(&mut ws), r#"{"status":"connected"}"#);

    ws.send(Message::text("trigger emergency")).unwrap();
    let ev = wait_event(channels);
    assert!(matches!(ev, TransportEvent::Text(0, ref t) if t.as_str() == "trigger emergency"));
    service.handle_transport_event(ev, 10, &mut hw, &mut transport, &mut sink);
    assert_eq!(read_text(&mut ws), r#"{"action":"emergency_activated"}"#);
    assert!(service.sequencer().is_running());

    ws.close(None).unwrap();
    let ev = wait_event(channels);
    assert_eq!(ev, TransportEvent::Disconnected(0));
    service.handle_transport_event(ev, 20, &mut hw, &mut transport, &mut sink);
    assert!(service.sessions().is_empty());
}

#[test]
fn chatty_client_close_is_still_reported() {
    let server = WsServer::bind(0).unwrap();
    let addr = server.local_addr().unwrap();
    let channels = leaked_channels();
    let _io = aegis::transport::io_task::spawn(server, channels).unwrap();

    let mut ws = client(addr);
    assert_eq!(wait_event(channels), TransportEvent::Connected(0));

    const BURST: usize = 40;
    for _ in 0..BURST {
        ws.send(Message::text("hi")).unwrap();
    }
    ws.close(None).unwrap();

    // Let the I/O thread run into a full queue before anyone drains it.
    std::thread::sleep(Duration::from_millis(300));

    let mut texts = 0;
    loop {
        match wait_event(channels) {
            TransportEvent::Text(0, _) => texts += 1,
            TransportEvent::Disconnected(0) => break,
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(texts, BURST, "reads pause instead of dropping frames");
}
