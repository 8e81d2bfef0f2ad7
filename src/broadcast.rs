//! Periodic sensor broadcast.
//!
//! ```text
//!   tick(now) ──▶ due? ──no──▶ NotDue
//!                  │yes
//!                  ▼
//!            sessions? ──none──▶ NoListeners   (timer not reset)
//!                  │some
//!                  ▼
//!   read sensors ─▶ snapshot ─▶ indicators ─▶ encode ─▶ fan-out ─▶ Sent
//! ```
//!
//! The interval timer only restarts when a snapshot is actually sent, so
//! the first session to connect after an idle period receives data on the
//! next tick.

use log::{info, warn};

use crate::alert::OutputMask;
use crate::app::ports::{OutputPort, SensorPort, TransportPort};
use crate::app::snapshot::SensorSnapshot;
use crate::app::wire::Outbound;
use crate::config::SystemConfig;
use crate::session::SessionRegistry;

/// Result of one [`BroadcastScheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BroadcastOutcome {
    /// Interval has not elapsed.
    NotDue,
    /// Interval elapsed but no session is connected.
    NoListeners,
    /// Snapshot taken but could not be encoded.
    EncodeFailed,
    /// Snapshot sent; `delivered` sessions accepted it.
    Sent {
        snapshot: SensorSnapshot,
        delivered: usize,
    },
}

/// Interval-driven sensor broadcaster.
#[derive(Debug)]
pub struct BroadcastScheduler {
    interval_ms: u64,
    diagnostic_interval_ms: u64,
    gas_threshold: i32,
    last_sent_ms: u64,
    last_diagnostic_ms: u64,
    sent_count: u64,
    /// Caution state of the most recent snapshot, if any was taken.
    last_caution: Option<bool>,
}

impl BroadcastScheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            interval_ms: u64::from(config.broadcast_interval_ms),
            diagnostic_interval_ms: u64::from(config.diagnostic_log_interval_ms),
            gas_threshold: config.gas_alarm_threshold,
            last_sent_ms: 0,
            last_diagnostic_ms: 0,
            sent_count: 0,
            last_caution: None,
        }
    }

    /// Whether the broadcast interval has elapsed at `now_ms`.
    ///
    /// Inclusive: a tick landing exactly on the interval fires, so a 100 ms
    /// loop paces a 2000 ms interval at 2000 ms rather than 2100 ms.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_sent_ms) >= self.interval_ms
    }

    /// Re-apply the red/green indicators from the latest snapshot. Used when
    /// an alert pattern hands the outputs back. No-op before the first
    /// snapshot.
    pub fn restore_indicators(&self, out: &mut impl OutputPort) {
        if let Some(caution) = self.last_caution {
            set_indicators(out, caution);
        }
    }

    /// Snapshots broadcast since boot.
    pub fn sent_count(&self) -> u64 {
        self.sent_count
    }

    /// Run one scheduling step.
    ///
    /// When `indicators_locked` is set (an alert pattern owns the outputs)
    /// the red/green indicators are left untouched.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + OutputPort),
        sessions: &mut SessionRegistry,
        transport: &mut impl TransportPort,
        indicators_locked: bool,
    ) -> BroadcastOutcome {
        if !self.is_due(now_ms) {
            return BroadcastOutcome::NotDue;
        }
        if sessions.is_empty() {
            return BroadcastOutcome::NoListeners;
        }

        // 1. One read, one snapshot
        let readings = hw.read_all();
        let snapshot = SensorSnapshot::capture(
            &readings,
            self.gas_threshold,
            now_ms / 1000,
            sessions.active_count(),
        );

        // 2. Local indicator: red on caution, green otherwise
        let caution = snapshot.status().is_emergency();
        self.last_caution = Some(caution);
        if !indicators_locked {
            set_indicators(hw, caution);
        }

        // 3. Encode and fan out
        let payload = match Outbound::Snapshot(&snapshot).encode() {
            Ok(p) => p,
            Err(e) => {
                warn!("snapshot encode failed: {}", e);
                return BroadcastOutcome::EncodeFailed;
            }
        };
        let delivered = sessions.broadcast(&payload, transport);

        self.last_sent_ms = now_ms;
        self.sent_count += 1;

        // 4. Rate-limited diagnostic line
        if now_ms.saturating_sub(self.last_diagnostic_ms) >= self.diagnostic_interval_ms {
            info!(
                "sent sensor data to {} client(s) (status={:?})",
                delivered,
                snapshot.status()
            );
            self.last_diagnostic_ms = now_ms;
        }

        BroadcastOutcome::Sent {
            snapshot,
            delivered,
        }
    }
}

fn set_indicators(out: &mut impl OutputPort, caution: bool) {
    out.set_outputs(OutputMask::RED, caution);
    out.set_outputs(OutputMask::GREEN, !caution);
}
