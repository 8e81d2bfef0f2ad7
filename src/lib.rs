//! AEGIS safety node firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alert;
pub mod app;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod pins;
pub mod session;
pub mod transport;

// Hardware-facing modules; the device implementations are guarded by cfg
// attributes inside, with simulation stubs on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
