//! Application core: lamp behaviour with no direct I/O.
//!
//! The LED task ([`service`]), the protocol callback ([`attributes`]) and the
//! sensor task ([`reporting`]) each live here. All interaction with hardware
//! happens through the **port traits** in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod attributes;
pub mod commands;
pub mod events;
pub mod light_store;
pub mod ports;
pub mod reporting;
pub mod service;
