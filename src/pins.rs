//! GPIO / peripheral pin assignments for the AEGIS node (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// IR flame sensor module, digital output.
/// Active LOW: the comparator pulls the line low when a flame is seen.
pub const FLAME_SENSOR_GPIO: i32 = 13;

/// MQ-2 combustible gas sensor, analog output.
/// ADC1 channel 6 (GPIO 34 on ESP32).
pub const MQ2_ADC_GPIO: i32 = 34;
/// ADC1 channel index for [`MQ2_ADC_GPIO`].
pub const MQ2_ADC_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Alert outputs
// ---------------------------------------------------------------------------

/// Red "caution" LED. Also flashed by the emergency pattern.
pub const RED_LED_GPIO: i32 = 32;
/// Green "normal" LED. Doubles as the connectivity heartbeat.
pub const GREEN_LED_GPIO: i32 = 25;
/// Active buzzer (driven HIGH = sounding).
pub const BUZZER_GPIO: i32 = 26;
