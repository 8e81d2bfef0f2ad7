//! MQ-2 combustible gas sensor.
//!
//! Reports the raw 12-bit ADC value; no calibration to ppm is applied.
//! The alarm threshold is compared against this raw value.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::ADC_MAX;

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
}

pub struct GasSensor {
    _channel: u32,
    last: i32,
}

impl GasSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            _channel: adc_channel,
            last: 0,
        }
    }

    /// Sample the sensor. Always within `0..=ADC_MAX`.
    pub fn read(&mut self) -> i32 {
        self.last = i32::from(self.read_raw()).min(ADC_MAX);
        self.last
    }

    /// Most recent sample.
    pub fn last(&self) -> i32 {
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self) -> u16 {
        crate::drivers::hw_init::adc1_read(self._channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self) -> u16 {
        SIM_GAS_ADC.load(Ordering::Relaxed)
    }
}
