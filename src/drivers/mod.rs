//! Output drivers and peripheral initialisation.

pub mod hw_init;
pub mod outputs;
