//! Tunable-white Zigbee lamp firmware library.
//!
//! Exposes the lamp core for integration testing. All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within each module, so the
//! whole library builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;
pub mod state;
