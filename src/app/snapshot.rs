//! Sensor readings and the immutable broadcast snapshot.
//!
//! [`SensorReadings`] is what a [`SensorPort`](super::ports::SensorPort)
//! returns. [`SensorSnapshot`] adds the derived status, timestamp, and
//! client count, and is the exact shape serialised to every session.

use serde::{Serialize, Serializer};

/// Body posture reported by the (simulated) IMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Posture {
    Standing = 0,
    Sitting = 1,
    Lying = 2,
}

impl Posture {
    /// Map a raw index onto a posture. Out-of-range values fold to `Lying`.
    pub fn from_index(idx: u8) -> Self {
        match idx {
            0 => Self::Standing,
            1 => Self::Sitting,
            _ => Self::Lying,
        }
    }
}

impl Serialize for Posture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Derived system status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Normal,
    Emergency,
}

impl Status {
    /// `Emergency` iff a flame or a fall is detected, or the gas level is
    /// strictly above `gas_threshold`.
    pub fn classify(readings: &SensorReadings, gas_threshold: i32) -> Self {
        if readings.flame_detected
            || readings.fall_detected
            || readings.gas_level > gas_threshold
        {
            Self::Emergency
        } else {
            Self::Normal
        }
    }

    pub fn is_emergency(self) -> bool {
        self == Self::Emergency
    }
}

/// One read of every sensor, without derived fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    pub heart_rate: i32,
    pub temperature_c: f32,
    /// Raw 12-bit MQ-2 ADC value.
    pub gas_level: i32,
    pub posture: Posture,
    pub fall_detected: bool,
    pub flame_detected: bool,
}

/// Immutable point-in-time snapshot broadcast to every session.
///
/// Field order matches the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    heart_rate: i32,
    temperature: f32,
    gas_level: i32,
    posture: Posture,
    fall_detected: bool,
    flame_detected: bool,
    status: Status,
    timestamp: u64,
    clients: usize,
}

impl SensorSnapshot {
    /// Build a snapshot in one step from a single reading.
    pub fn capture(
        readings: &SensorReadings,
        gas_threshold: i32,
        timestamp_secs: u64,
        clients: usize,
    ) -> Self {
        Self {
            heart_rate: readings.heart_rate,
            temperature: readings.temperature_c,
            gas_level: readings.gas_level,
            posture: readings.posture,
            fall_detected: readings.fall_detected,
            flame_detected: readings.flame_detected,
            status: Status::classify(readings, gas_threshold),
            timestamp: timestamp_secs,
            clients,
        }
    }

    pub fn heart_rate(&self) -> i32 {
        self.heart_rate
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature
    }

    pub fn gas_level(&self) -> i32 {
        self.gas_level
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    pub fn fall_detected(&self) -> bool {
        self.fall_detected
    }

    pub fn flame_detected(&self) -> bool {
        self.flame_detected
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn clients(&self) -> usize {
        self.clients
    }
}
