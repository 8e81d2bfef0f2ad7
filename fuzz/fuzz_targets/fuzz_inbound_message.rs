//! Fuzz target: inbound session text through `MonitorService`
//!
//! Feeds arbitrary text from a connected session and asserts that the
//! service never panics, replies only to recognised commands, and never
//! changes the session count.
//!
//! cargo fuzz run fuzz_inbound_message

#![no_main]

use aegis::alert::OutputMask;
use aegis::app::commands::Command;
use aegis::app::events::AppEvent;
use aegis::app::ports::{EventSink, OutputPort, TransportPort};
use aegis::app::service::MonitorService;
use aegis::config::SystemConfig;
use aegis::session::SessionId;
use aegis::transport::{TransportError, TransportEvent, inbound_text};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Sink;

impl EventSink for Sink {
    fn emit(&mut self, _event: &AppEvent) {}
}

#[derive(Default)]
struct Outputs(OutputMask);

impl OutputPort for Outputs {
    fn set_outputs(&mut self, mask: OutputMask, on: bool) {
        self.0 = if on { self.0.union(mask) } else { self.0.without(mask) };
    }

    fn outputs(&self) -> OutputMask {
        self.0
    }
}

#[derive(Default)]
struct Frames(Vec<String>);

impl TransportPort for Frames {
    fn send_text(&mut self, _session: SessionId, payload: &str) -> Result<(), TransportError> {
        self.0.push(payload.to_owned());
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Some(inbound) = inbound_text(text) else {
        return;
    };

    let mut service = MonitorService::new(SystemConfig::default());
    let (mut out, mut frames, mut sink) = (Outputs::default(), Frames::default(), Sink);
    service.handle_transport_event(TransportEvent::Connected(0), 0, &mut out, &mut frames, &mut sink);
    frames.0.clear();

    service.handle_transport_event(TransportEvent::Text(0, inbound), 1, &mut out, &mut frames, &mut sink);

    match Command::parse(text) {
        Some(cmd) => {
            assert_eq!(frames.0.len(), 1);
            assert!(frames.0[0].contains(cmd.ack_action()));
            assert!(service.sequencer().is_running());
        }
        None => {
            assert!(frames.0.is_empty());
            assert!(!service.sequencer().is_running());
        }
    }
    assert_eq!(service.sessions().active_count(), 1);
});
