//! Simulated wearable vitals: heart rate, skin temperature, posture, falls.
//!
//! No physical sensor is fitted for these yet; values are drawn from a
//! seedable RNG so runs can be reproduced.
//!
//! | Field        | Distribution                      |
//! |--------------|-----------------------------------|
//! | heart rate   | 70 + U[-10, 15) bpm               |
//! | temperature  | 25.0 + U[-10, 10) / 10 °C         |
//! | posture      | U[0, 3)                           |
//! | fall         | 5 % per sample                    |

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::snapshot::Posture;

pub const HEART_RATE_BASE: i32 = 70;
pub const TEMPERATURE_BASE_C: f32 = 25.0;
/// Percent chance a sample reports a fall.
pub const FALL_CHANCE_PCT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    pub heart_rate: i32,
    pub temperature_c: f32,
    pub posture: Posture,
    pub fall_detected: bool,
}

pub struct SimulatedVitals {
    rng: SmallRng,
}

impl SimulatedVitals {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seed from the platform entropy source.
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }

    pub fn sample(&mut self) -> Vitals {
        let heart_rate = HEART_RATE_BASE + self.rng.random_range(-10..15);
        let temperature_c =
            TEMPERATURE_BASE_C + self.rng.random_range(-10i16..10) as f32 / 10.0;
        let posture = Posture::from_index(self.rng.random_range(0..3));
        let fall_detected = self.rng.random_range(0..100) < FALL_CHANCE_PCT;
        Vitals {
            heart_rate,
            temperature_c,
            posture,
            fall_detected,
        }
    }
}

#[cfg(target_os = "espidf")]
fn entropy_seed() -> u64 {
    // SAFETY: esp_random reads the hardware RNG register.
    let (hi, lo) = unsafe {
        (
            esp_idf_sys::esp_random(),
            esp_idf_sys::esp_random(),
        )
    };
    (u64::from(hi) << 32) | u64::from(lo)
}

#[cfg(not(target_os = "espidf"))]
fn entropy_seed() -> u64 {
    use std::hash::{BuildHasher, Hasher};
    let mut h = std::collections::hash_map::RandomState::new().build_hasher();
    h.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    h.finish()
}
