//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the alert outputs, exposing them through
//! [`SensorPort`] and [`OutputPort`]. On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::alert::OutputMask;
use crate::app::ports::{OutputPort, SensorPort};
use crate::app::snapshot::SensorReadings;
use crate::drivers::outputs::AlertOutputs;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    outputs: AlertOutputs,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, outputs: AlertOutputs) -> Self {
        Self {
            sensor_hub,
            outputs,
        }
    }

    /// Direct driver access for boot-time routines (self-test, WiFi heartbeat).
    pub fn outputs_mut(&mut self) -> &mut AlertOutputs {
        &mut self.outputs
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_all(&mut self) -> SensorReadings {
        self.sensor_hub.read_all()
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl OutputPort for HardwareAdapter {
    fn set_outputs(&mut self, mask: OutputMask, on: bool) {
        self.outputs.set(mask, on);
    }

    fn outputs(&self) -> OutputMask {
        self.outputs.current()
    }
}
