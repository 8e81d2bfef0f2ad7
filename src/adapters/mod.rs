//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                   |
//! |---------------|---------------------|-------------------------------|
//! | `hardware`    | SensorPort          | ESP32 ADC, GPIO, vitals sim   |
//! |               | OutputPort          | ESP32 GPIO (LEDs, buzzer)     |
//! | `log_sink`    | EventSink           | Serial / tracing log output   |
//! | `config_file` | ConfigPort          | JSON file (host only)         |
//! | `time`        | —                   | ESP32 system timer / Instant  |
//! | `wifi`        | —                   | ESP-IDF WiFi STA              |
//! | `ws_server`   | —                   | WebSocket listener            |

#[cfg(not(target_os = "espidf"))]
pub mod config_file;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod wifi;
pub mod ws_server;
