//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor source and produces one [`SensorReadings`]
//! per read. Flame and gas come from the board; vitals are simulated.

pub mod flame;
pub mod gas;
pub mod vitals;

use crate::app::snapshot::SensorReadings;
use flame::FlameSensor;
use gas::GasSensor;
use vitals::SimulatedVitals;

/// Aggregates all sensor sources and produces a unified reading.
pub struct SensorHub {
    pub flame: FlameSensor,
    pub gas: GasSensor,
    pub vitals: SimulatedVitals,
}

impl SensorHub {
    /// Construct a new hub. Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(flame: FlameSensor, gas: GasSensor, vitals: SimulatedVitals) -> Self {
        Self { flame, gas, vitals }
    }

    /// Read every source once.
    pub fn read_all(&mut self) -> SensorReadings {
        let v = self.vitals.sample();
        SensorReadings {
            heart_rate: v.heart_rate,
            temperature_c: v.temperature_c,
            gas_level: self.gas.read(),
            posture: v.posture,
            fall_detected: v.fall_detected,
            flame_detected: self.flame.read(),
        }
    }
}
