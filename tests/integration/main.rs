//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one subsystem against the
//! mock adapters. Everything runs on the host with no real hardware.

mod attribute_tests;
mod mock_hw;
mod reporting_tests;
mod service_tests;
