//! End-to-end scenarios for the MonitorService pipeline.
//!
//! Transport events go in, frames and output calls come out. Time is
//! driven explicitly so every alert boundary is deterministic.

use crate::mock_hw::{MockHardware, RecordingSink, RecordingTransport};

use aegis::alert::{AlertKind, OutputMask};
use aegis::app::commands::Command;
use aegis::app::events::AppEvent;
use aegis::app::ports::OutputPort;
use aegis::app::service::MonitorService;
use aegis::app::snapshot::Status;
use aegis::broadcast::BroadcastOutcome;
use aegis::config::SystemConfig;
use aegis::session::SessionId;
use aegis::transport::channels::TransportChannels;
use aegis::transport::{TransportEvent, inbound_text};

const CONNECTED: &str = r#"{"status":"connected"}"#;
const EMERGENCY_ACK: &str = r#"{"action":"emergency_activated"}"#;
const SOS_ACK: &str = r#"{"action":"sos_activated"}"#;
const EMERGENCY_NOTICE: &str = r#"{"alert":"EMERGENCY_MANUAL_TRIGGER"}"#;
const SOS_NOTICE: &str = r#"{"alert":"SOS_SIGNAL_SENT"}"#;

struct Rig {
    service: MonitorService,
    hw: MockHardware,
    transport: RecordingTransport,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        let mut sink = RecordingSink::new();
        let mut service = MonitorService::new(SystemConfig::default());
        service.start(&mut sink);
        Self {
            service,
            hw: MockHardware::new(),
            transport: RecordingTransport::new(),
            sink,
        }
    }

    fn event(&mut self, event: TransportEvent, now_ms: u64) {
        self.service.handle_transport_event(
            event,
            now_ms,
            &mut self.hw,
            &mut self.transport,
            &mut self.sink,
        );
    }

    fn connect(&mut self, id: SessionId, now_ms: u64) {
        self.event(TransportEvent::Connected(id), now_ms);
    }

    fn disconnect(&mut self, id: SessionId, now_ms: u64) {
        self.event(TransportEvent::Disconnected(id), now_ms);
    }

    fn say(&mut self, id: SessionId, text: &str, now_ms: u64) {
        let text = inbound_text(text).unwrap();
        self.event(TransportEvent::Text(id, text), now_ms);
    }

    fn tick(&mut self, now_ms: u64) -> BroadcastOutcome {
        self.service
            .tick(now_ms, &mut self.hw, &mut self.transport, &mut self.sink)
    }

    /// Tick every 100 ms over `(from, to]`.
    fn run(&mut self, from: u64, to: u64) {
        let mut t = from + 100;
        while t <= to {
            let _ = self.tick(t);
            t += 100;
        }
    }
}

// ── Connect → command → ack → completion notice ──────────────

#[test]
fn emergency_command_acks_sender_then_notifies_everyone() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.connect(1, 0);

    assert_eq!(rig.transport.frames_for(0), [CONNECTED]);
    assert_eq!(rig.transport.frames_for(1), [CONNECTED]);

    rig.say(0, "please trigger emergency now", 100);
    assert_eq!(rig.transport.frames_for(0), [CONNECTED, EMERGENCY_ACK]);
    assert_eq!(rig.transport.frames_for(1), [CONNECTED], "ack goes to sender only");
    assert!(rig.service.sequencer().is_running());

    // Still playing one tick before the end.
    rig.run(100, 2000);
    assert_eq!(rig.transport.count_payload(EMERGENCY_NOTICE), 0);
    assert!(rig.service.sequencer().is_running());

    let _ = rig.tick(2100);
    assert_eq!(rig.transport.count_payload(EMERGENCY_NOTICE), 2);
    assert_eq!(rig.transport.frames_for(0).last(), Some(&EMERGENCY_NOTICE));
    assert_eq!(rig.transport.frames_for(1).last(), Some(&EMERGENCY_NOTICE));
    assert!(!rig.service.sequencer().is_running());
    assert_eq!(
        rig.hw.outputs(),
        OutputMask::GREEN,
        "buzzer released and the calm indicator restored after the pattern"
    );
    assert!(rig.sink.events.contains(&AppEvent::AlertCompleted {
        kind: AlertKind::Emergency,
        delivered: 2,
    }));
}

#[test]
fn sos_completion_notice_is_exact() {
    let mut rig = Rig::new();
    rig.connect(3, 0);
    rig.say(3, "sos", 0);
    assert_eq!(rig.transport.frames_for(3), [CONNECTED, SOS_ACK]);

    rig.run(0, 5200);
    assert_eq!(rig.transport.count_payload(SOS_NOTICE), 0);
    let _ = rig.tick(5300);
    assert_eq!(rig.transport.count_payload(SOS_NOTICE), 1);
}

// ── Broadcast gating ─────────────────────────────────────────

#[test]
fn no_sessions_means_no_broadcasts() {
    let mut rig = Rig::new();
    for k in 1..=5u64 {
        assert_eq!(rig.tick(k * 2000), BroadcastOutcome::NoListeners);
    }
    assert!(rig.transport.sent.is_empty());
    assert_eq!(rig.hw.reads, 0, "sensors are not read without listeners");
    assert!(rig.hw.calls.is_empty());
}

#[test]
fn broadcast_after_disconnect_reaches_only_the_remaining_session() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.connect(1, 0);

    match rig.tick(2000) {
        BroadcastOutcome::Sent { snapshot, delivered } => {
            assert_eq!(delivered, 2);
            assert_eq!(snapshot.clients(), 2);
        }
        other => panic!("expected a broadcast, got {other:?}"),
    }

    rig.disconnect(0, 2500);
    let mark = rig.transport.sent.len();

    match rig.tick(4000) {
        BroadcastOutcome::Sent { snapshot, delivered } => {
            assert_eq!(delivered, 1);
            assert_eq!(snapshot.clients(), 1);
            assert_eq!(snapshot.timestamp(), 4);
        }
        other => panic!("expected a broadcast, got {other:?}"),
    }

    let after = &rig.transport.sent[mark..];
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].0, 1);
    let v: serde_json::Value = serde_json::from_str(&after[0].1).unwrap();
    assert_eq!(v["clients"], 1);
    assert_eq!(v["status"], "NORMAL");
}

#[test]
fn first_listener_after_idle_period_gets_data_on_next_tick() {
    let mut rig = Rig::new();
    assert_eq!(rig.tick(2000), BroadcastOutcome::NoListeners);
    rig.connect(0, 2050);
    assert!(matches!(rig.tick(2100), BroadcastOutcome::Sent { delivered: 1, .. }));
}

#[test]
fn hazard_reading_broadcasts_emergency_and_lights_red() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.hw.readings.flame_detected = true;

    match rig.tick(2000) {
        BroadcastOutcome::Sent { snapshot, .. } => {
            assert_eq!(snapshot.status(), Status::Emergency);
        }
        other => panic!("expected a broadcast, got {other:?}"),
    }
    assert!(rig.hw.outputs().contains(OutputMask::RED));
    assert!(!rig.hw.outputs().contains(OutputMask::GREEN));

    rig.hw.readings.flame_detected = false;
    let _ = rig.tick(4000);
    assert!(rig.hw.outputs().contains(OutputMask::GREEN));
    assert!(!rig.hw.outputs().contains(OutputMask::RED));
}

#[test]
fn failed_delivery_keeps_session_registered() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.connect(1, 0);
    rig.transport.failing.push(1);

    assert!(matches!(rig.tick(2000), BroadcastOutcome::Sent { delivered: 1, .. }));
    assert!(rig.service.sessions().contains(1));
    assert_eq!(rig.service.sessions().is_healthy(1), Some(false));
    assert_eq!(rig.service.sessions().is_healthy(0), Some(true));
}

// ── Alert exclusivity ────────────────────────────────────────

#[test]
fn command_during_alert_is_acked_but_does_not_interleave() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.say(0, "emergency", 0);
    rig.run(0, 400);

    rig.say(0, "sos", 500);
    assert_eq!(rig.transport.frames_for(0)[1..], [EMERGENCY_ACK, SOS_ACK]);
    assert_eq!(rig.service.sequencer().active(), Some(AlertKind::Emergency));
    assert!(rig.sink.events.contains(&AppEvent::AlertRejected {
        requested: Command::Sos,
        active: AlertKind::Emergency,
    }));

    rig.run(400, 1900);
    let red_buzzer = OutputMask::RED | OutputMask::BUZZER;
    assert!(
        rig.hw.calls.iter().all(|c| c.mask == red_buzzer),
        "only emergency steps drive the outputs: {:?}",
        rig.hw.calls
    );

    let _ = rig.tick(2000);
    assert_eq!(rig.transport.count_payload(EMERGENCY_NOTICE), 1);
    assert_eq!(rig.transport.count_payload(SOS_NOTICE), 0);
    assert_eq!(rig.service.sequencer().completed(), 1);

    // Once idle, the same command starts normally.
    rig.say(0, "sos", 2100);
    assert_eq!(rig.service.sequencer().active(), Some(AlertKind::Distress));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AlertStarted { .. })),
        2
    );
}

#[test]
fn sessions_and_broadcasts_stay_live_while_an_alert_plays() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.say(0, "sos", 0);
    let calls_before = rig.hw.calls.len();

    rig.run(0, 900);
    rig.connect(1, 1000);
    assert_eq!(rig.transport.frames_for(1), [CONNECTED]);

    rig.run(900, 2000);
    assert_eq!(rig.transport.snapshots().len(), 2, "snapshot reached both sessions");
    assert!(rig.service.sequencer().is_running());
    assert!(
        !rig.hw.touched_since(calls_before, OutputMask::RED | OutputMask::GREEN),
        "indicators stay off while the buzzer pattern owns the outputs"
    );
}

#[test]
fn caution_light_returns_after_an_alert_with_no_listeners_left() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.hw.readings.flame_detected = true;
    let _ = rig.tick(2000);
    assert_eq!(rig.hw.outputs(), OutputMask::RED);

    rig.say(0, "emergency", 2000);
    rig.disconnect(0, 2050);
    rig.run(2000, 4000);
    assert!(!rig.service.sequencer().is_running());
    assert_eq!(rig.hw.outputs(), OutputMask::RED, "caution indicator restored");
}

// ── Transport queue pressure ─────────────────────────────────

#[test]
fn disconnect_survives_a_text_flood_on_the_event_queue() {
    let channels = TransportChannels::new();
    let mut rig = Rig::new();

    assert!(channels.push_lifecycle(TransportEvent::Connected(0)).is_ok());
    assert!(channels.push_lifecycle(TransportEvent::Connected(1)).is_ok());
    while channels.push_text(1, inbound_text("hi").unwrap()) {}
    assert!(channels.push_lifecycle(TransportEvent::Disconnected(0)).is_ok());

    let mut events = Vec::new();
    channels.drain_events(|e| events.push(e));
    for event in events {
        rig.event(event, 100);
    }
    assert_eq!(rig.service.sessions().active_count(), 1);
    assert!(!rig.service.sessions().contains(0));

    // The slot is reused by a fresh client, which gets its greeting.
    rig.connect(0, 200);
    assert_eq!(rig.transport.frames_for(0), [CONNECTED, CONNECTED]);
    assert_eq!(rig.service.sessions().active_count(), 2);
}

// ── Parsing edge cases ───────────────────────────────────────

#[test]
fn message_with_both_keywords_triggers_emergency() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.say(0, "sos and emergency", 10);
    assert_eq!(rig.transport.frames_for(0)[1], EMERGENCY_ACK);
    assert_eq!(rig.service.sequencer().active(), Some(AlertKind::Emergency));
}

#[test]
fn unrecognised_text_gets_no_reply() {
    let mut rig = Rig::new();
    rig.connect(0, 0);
    rig.say(0, "hello there", 10);
    rig.say(0, "EMERGENCY", 20);
    assert_eq!(rig.transport.frames_for(0), [CONNECTED]);
    assert!(!rig.service.sequencer().is_running());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CommandIgnored { session: 0 })),
        2
    );
}

#[test]
fn message_from_unknown_session_is_dropped() {
    let mut rig = Rig::new();
    rig.say(4, "emergency", 0);
    assert!(rig.transport.sent.is_empty());
    assert!(!rig.service.sequencer().is_running());
}

// ── Registry edges ───────────────────────────────────────────

#[test]
fn sixth_session_is_rejected_and_duplicates_are_ignored() {
    let mut rig = Rig::new();
    for id in 0..6 {
        rig.connect(id, 0);
    }
    rig.connect(2, 0);

    assert_eq!(rig.service.sessions().active_count(), 5);
    assert_eq!(rig.transport.count_payload(CONNECTED), 5);
    assert!(rig.sink.events.contains(&AppEvent::SessionRejected { session: 5 }));

    rig.disconnect(9, 0);
    assert_eq!(rig.service.sessions().active_count(), 5);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SessionClosed { .. })),
        0
    );
}
