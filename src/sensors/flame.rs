//! IR flame sensor (digital comparator module).
//!
//! The module pulls its output LOW when it sees a flame, so the reading is
//! the inverted pin level.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the configured GPIO via hw_init.
//! On host/test: reads from a static `AtomicBool` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_FLAME: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_flame(detected: bool) {
    SIM_FLAME.store(detected, Ordering::Relaxed);
}

pub struct FlameSensor {
    _gpio: i32,
}

impl FlameSensor {
    pub fn new(gpio: i32) -> Self {
        Self { _gpio: gpio }
    }

    /// `true` while a flame is detected.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> bool {
        !crate::drivers::hw_init::gpio_read(self._gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> bool {
        SIM_FLAME.load(Ordering::Relaxed)
    }
}
