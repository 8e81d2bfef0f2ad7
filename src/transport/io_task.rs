//! Async WebSocket I/O task (host builds).
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! multi-task scheduling and `async-io-mini` for reactor-driven timers.
//! Three concurrent futures:
//!
//! 1. **Accept**: polls `try_accept()` every 50ms
//! 2. **Read**: drains every connected socket every 5ms
//! 3. **Write**: wakes on `outbound.receive().await` as soon as the
//!    control loop queues a frame
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  ws-io thread                                            │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                      │  │
//!  │  │  ┌─────────┐  ┌──────────┐  ┌───────────────┐      │  │
//!  │  │  │ Accept  │  │ Read All │  │ Write (async) │      │  │
//!  │  │  │ 50ms ⏱  │  │ 5ms ⏱    │  │ wake-on-send  │      │  │
//!  │  │  └─────────┘  └──────────┘  └───────────────┘      │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use log::{debug, error, info, warn};

use super::TransportEvent;
use super::channels::TransportChannels;
use crate::adapters::ws_server::{ReadOutcome, WsServer};
use crate::session::{MAX_SESSIONS, SessionId};

/// Frames read from one socket before moving to the next.
const MAX_READS_PER_PASS: usize = 8;

/// Connects and disconnects the control loop has not been told about yet.
type Backlog = heapless::Deque<TransportEvent, { 2 * MAX_SESSIONS }>;

/// State shared by the three I/O futures.
struct IoState {
    server: RefCell<WsServer>,
    backlog: RefCell<Backlog>,
    channels: &'static TransportChannels,
}

type Shared = Rc<IoState>;

impl IoState {
    /// Queue a connect/disconnect, holding it in the backlog if the event
    /// channel is full. Order is kept: nothing jumps ahead of the backlog.
    fn report(&self, event: TransportEvent) {
        let mut backlog = self.backlog.borrow_mut();
        let event = if backlog.is_empty() {
            match self.channels.push_lifecycle(event) {
                Ok(()) => return,
                Err(event) => event,
            }
        } else {
            event
        };
        warn!("WS: event queue full, holding {:?}", event);
        if let Err(event) = backlog.push_back(event) {
            error!("WS: lifecycle backlog overflow, lost {:?}", event);
        }
    }

    /// Retry held events. True once the backlog is empty.
    fn flush_backlog(&self) -> bool {
        let mut backlog = self.backlog.borrow_mut();
        while let Some(event) = backlog.pop_front() {
            if let Err(event) = self.channels.push_lifecycle(event) {
                // Cannot fail: the slot was just freed by pop_front.
                let _ = backlog.push_front(event);
                return false;
            }
        }
        true
    }

    fn drop_session(&self, server: &mut WsServer, id: SessionId) {
        server.disconnect(id);
        self.report(TransportEvent::Disconnected(id));
    }
}

/// Accept task. Connection setup is infrequent, 50ms is plenty.
///
/// Pending connections stay in the listen backlog while the event queue is
/// short on room.
async fn accept_loop(io: Shared) {
    loop {
        if io.flush_backlog() && io.channels.has_headroom() {
            let accepted = io.server.borrow_mut().try_accept();
            if let Some(id) = accepted {
                io.report(TransportEvent::Connected(id));
            }
        }
        async_io_mini::Timer::after(Duration::from_millis(50)).await;
    }
}

/// Read task: drains buffered frames and flushes pending writes.
///
/// Reading pauses while the event queue is down to its disconnect reserve;
/// unread frames wait in the socket until the control loop catches up.
async fn read_loop(io: Shared) {
    loop {
        let clear = io.flush_backlog();
        {
            let mut s = io.server.borrow_mut();
            for idx in 0..MAX_SESSIONS {
                let id = idx as SessionId;
                if !s.is_connected(id) {
                    continue;
                }
                let mut closed = false;
                for _ in 0..MAX_READS_PER_PASS {
                    if !clear || !io.channels.has_headroom() {
                        break;
                    }
                    match s.poll_read(id) {
                        ReadOutcome::Idle => break,
                        ReadOutcome::Ignored => {}
                        ReadOutcome::Text(text) => {
                            io.channels.push_text(id, text);
                        }
                        ReadOutcome::Closed => {
                            closed = true;
                            break;
                        }
                    }
                }
                if closed || s.flush(id).is_err() {
                    io.drop_session(&mut s, id);
                }
            }
        }
        async_io_mini::Timer::after(Duration::from_millis(5)).await;
    }
}

/// Write task: wakes instantly when the control loop queues a frame.
async fn write_loop(io: Shared) {
    loop {
        let msg = io.channels.outbound.receive().await;

        let mut s = io.server.borrow_mut();
        if !s.is_connected(msg.session) {
            debug!("WS: [{}] gone, dropping frame", msg.session);
            continue;
        }
        if let Err(e) = s.send(msg.session, &msg.payload) {
            warn!("WS: write to [{}] failed: {}", msg.session, e);
            io.drop_session(&mut s, msg.session);
        }
    }
}

fn run_io_loop(server: WsServer, channels: &'static TransportChannels) {
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    let io: Shared = Rc::new(IoState {
        server: RefCell::new(server),
        backlog: RefCell::new(Backlog::new()),
        channels,
    });

    executor.spawn(accept_loop(io.clone())).detach();
    executor.spawn(read_loop(io.clone())).detach();
    executor.spawn(write_loop(io)).detach();

    info!("WS I/O task started ({} max clients)", MAX_SESSIONS);

    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Spawn the I/O task on its own thread. Takes ownership of the server.
pub fn spawn(
    server: WsServer,
    channels: &'static TransportChannels,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("ws-io".into())
        .spawn(move || run_io_loop(server, channels))
}
