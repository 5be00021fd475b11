//! Lamp configuration parameters.
//!
//! Everything tunable about the lamp lives here: channel wiring, the supported
//! colour-temperature window, the defaults used before anything was persisted,
//! and the timing of every status animation.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of PWM outputs on the LED driver.
pub const CHANNEL_COUNT: u8 = 8;

/// Channel indices assigned to one colour role.
pub type ChannelGroup = Vec<u8, 8>;

/// Animation played once at power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootPattern {
    /// A bright head rotating around the channel ring with a fading tail.
    TrailSpin,
    /// Per-channel stepped ramp up to full, then back down.
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSpinParams {
    pub rotations: u8,
    /// Duty of the head channel.
    pub head_duty: u8,
    /// Duty lost per channel of distance behind the head.
    pub trail_step: u8,
    pub hold_ms: u32,
    /// Step size of the closing fade-up/fade-down.
    pub fade_step: u8,
    pub fade_delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampParams {
    pub step: u8,
    /// Delay after each single-channel write.
    pub delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkParams {
    pub pulses: u8,
    pub on_ms: u32,
    pub off_ms: u32,
    pub duty: u8,
}

/// Core lamp configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampConfig {
    // --- Channel wiring ---
    /// Warm-white (amber) outputs.
    pub amber_channels: ChannelGroup,
    /// Cool-white outputs.
    pub white_channels: ChannelGroup,

    // --- Colour temperature ---
    /// Warmest temperature the LEDs can produce (pure amber).
    pub kelvin_min: u16,
    /// Coolest temperature the LEDs can produce (pure white).
    pub kelvin_max: u16,
    /// Advertised ColorTemperature range in mireds (coolest first).
    pub mireds_min: u16,
    pub mireds_max: u16,

    // --- Defaults when nothing is persisted ---
    pub default_brightness: u8,
    pub default_mireds: u16,

    // --- Animations ---
    pub breathing_hz: f32,
    pub animation_tick_ms: u32,
    pub boot_pattern: BootPattern,
    pub trail: TrailSpinParams,
    pub ramp: RampParams,
    pub blink: BlinkParams,

    // --- Sensors ---
    pub report_interval_ms: u32,
    pub tc74_enabled: bool,
    /// Off by default: the humidity die answers on the LED driver's address.
    pub ms8607_enabled: bool,
}

impl Default for LampConfig {
    fn default() -> Self {
        let mireds_min = 200;
        let mireds_max = 455;
        Self {
            amber_channels: Vec::from_slice(&[0, 1, 2, 3]).unwrap_or_default(),
            white_channels: Vec::from_slice(&[4, 5, 6, 7]).unwrap_or_default(),

            kelvin_min: 2200,
            kelvin_max: 5000,
            mireds_min,
            mireds_max,

            default_brightness: 50,
            default_mireds: mireds_min + (mireds_max - mireds_min) / 2, // 327

            breathing_hz: 0.2,
            animation_tick_ms: 10, // 100 Hz
            boot_pattern: BootPattern::TrailSpin,
            trail: TrailSpinParams {
                rotations: 2,
                head_duty: 255,
                trail_step: 64,
                hold_ms: 60,
                fade_step: 15,
                fade_delay_ms: 10,
            },
            ramp: RampParams {
                step: 20,
                delay_ms: 50,
            },
            blink: BlinkParams {
                pulses: 3,
                on_ms: 200,
                off_ms: 200,
                duty: 255,
            },

            report_interval_ms: 2000,
            tc74_enabled: true,
            ms8607_enabled: false,
        }
    }
}

impl LampConfig {
    /// Every channel in ascending order, amber and white combined.
    pub fn all_channels(&self) -> ChannelGroup {
        let mut all = ChannelGroup::new();
        for &ch in self.amber_channels.iter().chain(self.white_channels.iter()) {
            // Capacity equals CHANNEL_COUNT and validate() rejects duplicates.
            let _ = all.push(ch);
        }
        all.sort_unstable();
        all
    }

    /// Animation tick as seconds.
    pub fn tick_secs(&self) -> f32 {
        self.animation_tick_ms as f32 / 1000.0
    }

    /// Reject invalid values instead of clamping them.
    pub fn validate(&self) -> Result<()> {
        if self.amber_channels.is_empty() {
            return Err(Error::InvalidArgument("amber_channels must not be empty"));
        }
        if self.amber_channels.len() != self.white_channels.len() {
            return Err(Error::InvalidArgument(
                "amber_channels and white_channels must have equal length",
            ));
        }
        let mut seen = 0u8;
        for &ch in self.amber_channels.iter().chain(self.white_channels.iter()) {
            if ch >= CHANNEL_COUNT {
                return Err(Error::InvalidArgument("channel index must be 0–7"));
            }
            if seen & (1 << ch) != 0 {
                return Err(Error::InvalidArgument(
                    "a channel may belong to only one group",
                ));
            }
            seen |= 1 << ch;
        }
        if self.kelvin_min == 0 || self.kelvin_min >= self.kelvin_max {
            return Err(Error::InvalidArgument("kelvin_min must be > 0 and < kelvin_max"));
        }
        if self.mireds_min == 0 || self.mireds_min >= self.mireds_max {
            return Err(Error::InvalidArgument("mireds_min must be > 0 and < mireds_max"));
        }
        if !(self.mireds_min..=self.mireds_max).contains(&self.default_mireds) {
            return Err(Error::InvalidArgument(
                "default_mireds must lie within mireds_min..=mireds_max",
            ));
        }
        if !(self.breathing_hz > 0.0 && self.breathing_hz <= 10.0) {
            return Err(Error::InvalidArgument("breathing_hz must be in (0, 10]"));
        }
        if !(1..=1000).contains(&self.animation_tick_ms) {
            return Err(Error::InvalidArgument("animation_tick_ms must be 1–1000"));
        }
        if self.report_interval_ms < self.animation_tick_ms {
            return Err(Error::InvalidArgument(
                "report_interval_ms must not be shorter than one animation tick",
            ));
        }
        if self.ramp.step == 0 || self.trail.fade_step == 0 {
            return Err(Error::InvalidArgument("ramp and fade steps must be non-zero"));
        }
        Ok(())
    }
}
