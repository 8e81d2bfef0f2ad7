//! Alert output driver: red LED, green LED, and buzzer.
//!
//! Three plain GPIO outputs, driven HIGH = on.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the pins via hw_init.
//! On host/test: tracks state in-memory only.

use core::time::Duration;

use log::info;

use crate::alert::OutputMask;
use crate::drivers::hw_init;
use crate::pins;

/// Length of the power-on lamp test.
pub const SELF_TEST_DURATION: Duration = Duration::from_millis(500);

const OUTPUT_PINS: [(OutputMask, i32); 3] = [
    (OutputMask::RED, pins::RED_LED_GPIO),
    (OutputMask::GREEN, pins::GREEN_LED_GPIO),
    (OutputMask::BUZZER, pins::BUZZER_GPIO),
];

pub struct AlertOutputs {
    current: OutputMask,
}

impl Default for AlertOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertOutputs {
    pub fn new() -> Self {
        Self {
            current: OutputMask::NONE,
        }
    }

    /// Drive each output in `mask` to `on`. Others are left alone.
    pub fn set(&mut self, mask: OutputMask, on: bool) {
        for (bit, pin) in OUTPUT_PINS {
            if mask.contains(bit) {
                hw_init::gpio_write(pin, on);
            }
        }
        self.current = if on {
            self.current.union(mask)
        } else {
            self.current.without(mask)
        };
    }

    /// Invert each output in `mask`.
    pub fn toggle(&mut self, mask: OutputMask) {
        for (bit, _) in OUTPUT_PINS {
            if mask.contains(bit) {
                let on = !self.current.contains(bit);
                self.set(bit, on);
            }
        }
    }

    pub fn all_off(&mut self) {
        self.set(OutputMask::ALL, false);
    }

    pub fn current(&self) -> OutputMask {
        self.current
    }

    /// Power-on lamp test: every output on for [`SELF_TEST_DURATION`],
    /// then off. Blocks the caller; run once before connectivity.
    pub fn startup_self_test(&mut self) {
        info!("outputs: self-test");
        self.set(OutputMask::ALL, true);
        std::thread::sleep(SELF_TEST_DURATION);
        self.all_off();
    }
}
