//! Brightness + colour-temperature mixing.
//!
//! Maps `(brightness, mireds)` onto the amber and white channel groups by
//! linear interpolation in Kelvin across the range the LEDs can physically
//! produce:
//!
//! ```text
//!   K     = 1_000_000 / mireds, clamped to [K_min, K_max]
//!   white = (K - K_min) / (K_max - K_min)
//!   amber = 1 - white
//! ```
//!
//! A warm request (high mireds, low Kelvin) therefore lights only amber and
//! a cool one only white. The mixer holds configuration but no state, so
//! applying the same input twice leaves the outputs unchanged.

use crate::app::ports::PwmPort;
use crate::config::{ChannelGroup, LampConfig};
use crate::error::Result;

/// Per-group duties produced for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixOutput {
    pub amber: u8,
    pub white: u8,
}

pub struct Mixer {
    amber: ChannelGroup,
    white: ChannelGroup,
    kelvin_min: u32,
    kelvin_max: u32,
}

impl Mixer {
    /// An inverted Kelvin range collapses to `kelvin_min`; use
    /// [`LampConfig::validate`] to reject it up front.
    pub fn new(config: &LampConfig) -> Self {
        let kelvin_min = u32::from(config.kelvin_min);
        Self {
            amber: config.amber_channels.clone(),
            white: config.white_channels.clone(),
            kelvin_min,
            kelvin_max: u32::from(config.kelvin_max).max(kelvin_min),
        }
    }

    /// Kelvin for `mireds`, clamped to the LED range. Zero mireds is
    /// treated as infinitely cool.
    pub fn kelvin(&self, mireds: u16) -> u32 {
        let k = if mireds == 0 {
            self.kelvin_max
        } else {
            1_000_000 / u32::from(mireds)
        };
        k.clamp(self.kelvin_min, self.kelvin_max)
    }

    /// Fraction of `brightness` that goes to the white group.
    pub fn white_ratio(&self, mireds: u16) -> f32 {
        if self.kelvin_max == self.kelvin_min {
            return 0.0;
        }
        let span = (self.kelvin_max - self.kelvin_min) as f32;
        let ratio = (self.kelvin(mireds) - self.kelvin_min) as f32 / span;
        ratio.clamp(0.0, 1.0)
    }

    /// Pure mix computation.
    pub fn compute(&self, brightness: u8, mireds: u16) -> MixOutput {
        let white_ratio = self.white_ratio(mireds);
        let amber_ratio = 1.0 - white_ratio;
        let b = f32::from(brightness);
        MixOutput {
            amber: (b * amber_ratio).round().clamp(0.0, 255.0) as u8,
            white: (b * white_ratio).round().clamp(0.0, 255.0) as u8,
        }
    }

    /// Compute and write amber first, then white.
    ///
    /// Both groups are always attempted. On failure the first error is
    /// returned and whatever was written stays written.
    pub fn apply(&self, pwm: &mut impl PwmPort, brightness: u8, mireds: u16) -> Result<MixOutput> {
        let out = self.compute(brightness, mireds);
        let amber = pwm.set_group(&self.amber, out.amber);
        let white = pwm.set_group(&self.white, out.white);
        amber.and(white).map(|()| out)
    }
}
