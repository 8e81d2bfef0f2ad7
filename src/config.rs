//! System configuration parameters
//!
//! All tunable parameters for the AEGIS node. Defaults match the shipped
//! firmware; host builds may override them from a JSON file (see
//! [`crate::adapters::config_file`]).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Full-scale reading of the 12-bit ADC.
pub const ADC_MAX: i32 = 4095;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Network ---
    /// WebSocket listen port.
    pub ws_port: u16,
    /// Station-mode SSID.
    pub wifi_ssid: heapless::String<32>,
    /// Station-mode passphrase (empty for open networks).
    pub wifi_password: heapless::String<64>,

    // --- Thresholds ---
    /// Raw MQ-2 ADC level above which the node reports EMERGENCY.
    pub gas_alarm_threshold: i32,

    // --- Simulation ---
    /// Fixed seed for the simulated vitals source. `None` seeds from entropy.
    pub sim_seed: Option<u64>,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Sensor broadcast interval (milliseconds)
    pub broadcast_interval_ms: u32,
    /// Minimum spacing of the "sent sensor data" diagnostic line (milliseconds)
    pub diagnostic_log_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network
            ws_port: 81,
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),

            // Thresholds
            gas_alarm_threshold: 2000,

            // Simulation
            sim_seed: None,

            // Timing
            control_loop_interval_ms: 100,     // 10 Hz
            broadcast_interval_ms: 2000,       // every 2 s
            diagnostic_log_interval_ms: 10_000, // every 10 s
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ws_port == 0 {
            return Err(ConfigError::ValidationFailed("ws_port must be non-zero"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be non-zero",
            ));
        }
        if self.broadcast_interval_ms <= self.control_loop_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "broadcast_interval_ms must exceed control_loop_interval_ms",
            ));
        }
        if self.diagnostic_log_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "diagnostic_log_interval_ms must be non-zero",
            ));
        }
        if !(0..=ADC_MAX).contains(&self.gas_alarm_threshold) {
            return Err(ConfigError::ValidationFailed(
                "gas_alarm_threshold must be within the 12-bit ADC range",
            ));
        }
        Ok(())
    }
}
