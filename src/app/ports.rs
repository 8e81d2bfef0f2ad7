//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, alert outputs, the WebSocket transport, event
//! sinks) implement these traits. The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the domain core never touches hardware
//! or sockets directly.

use crate::alert::OutputMask;
use crate::config::SystemConfig;
use crate::session::SessionId;
use crate::transport::TransportError;

use super::snapshot::SensorReadings;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
///
/// Reads cannot fail. Hardware adapters return the last good value or a
/// simulated one; the core never sees a partial reading.
pub trait SensorPort {
    /// Read every sensor and return one consistent set of values.
    fn read_all(&mut self) -> SensorReadings;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → LEDs / buzzer)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the local alert outputs.
pub trait OutputPort {
    /// Drive every output named in `mask` HIGH (`on`) or LOW. Outputs
    /// outside `mask` keep their current level.
    fn set_outputs(&mut self, mask: OutputMask, on: bool);

    /// Outputs currently driven HIGH.
    fn outputs(&self) -> OutputMask;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → connected sessions)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the session transport.
pub trait TransportPort {
    /// Queue a text frame for one session.
    fn send_text(&mut self, session: SessionId, payload: &str) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration at boot.
///
/// Implementations MUST call [`SystemConfig::validate`] before returning a
/// loaded value.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
