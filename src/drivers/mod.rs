//! Lamp output drivers and task helpers.

pub mod animation;
pub mod task;
pub mod tlc59108;
