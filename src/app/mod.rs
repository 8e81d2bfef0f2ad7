//! Application core: pure domain logic, zero I/O.
//!
//! Session bookkeeping, command routing, alert sequencing, and sensor
//! broadcasting for the AEGIS node. All interaction with hardware and the
//! network happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod snapshot;
pub mod wire;
