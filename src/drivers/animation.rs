//! Status animations on the LED outputs.
//!
//! The [`Animator`] drives the PWM outputs while the lamp has no network
//! command to show. Exactly one mode is active at a time:
//!
//! | Mode               | Kind      | Purpose                               |
//! |--------------------|-----------|---------------------------------------|
//! | Idle               | -         | outputs belong to the mixer           |
//! | Breathing          | per tick  | "not joined yet" indicator            |
//! | BootSequence       | blocking  | power-on self test, once              |
//! | ConfirmationBlink  | blocking  | "joined" acknowledgement, once        |
//!
//! Entering any mode clears the breathing `enabled` flag first, so a tick
//! arriving after a blocking sequence can never resume breathing on its own.
//!
//! Write failures inside a sequence are logged and the sequence carries on;
//! the first error is returned once the sequence has finished.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::ports::PwmPort;
use crate::config::{BlinkParams, BootPattern, ChannelGroup, LampConfig, RampParams, TrailSpinParams};
use crate::error::{Error, Result};

use super::tlc59108::percent_to_duty;

const TWO_PI: f32 = core::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationMode {
    Idle,
    Breathing,
    BootSequence,
    ConfirmationBlink,
}

/// Breathing waveform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub enabled: bool,
    /// Seconds into the current breathing period.
    pub phase: f32,
    pub frequency: f32,
}

pub struct Animator {
    mode: AnimationMode,
    breathing: AnimationState,
    channels: ChannelGroup,
    boot_pattern: BootPattern,
    trail: TrailSpinParams,
    ramp: RampParams,
    blink: BlinkParams,
}

impl Animator {
    pub fn new(config: &LampConfig) -> Self {
        Self {
            mode: AnimationMode::Idle,
            breathing: AnimationState {
                enabled: false,
                phase: 0.0,
                frequency: config.breathing_hz,
            },
            channels: config.all_channels(),
            boot_pattern: config.boot_pattern,
            trail: config.trail,
            ramp: config.ramp,
            blink: config.blink,
        }
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn breathing(&self) -> &AnimationState {
        &self.breathing
    }

    fn enter(&mut self, mode: AnimationMode) {
        self.breathing.enabled = false;
        if self.mode != mode {
            debug!("animation: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Hand the outputs back; nothing is written.
    pub fn stop(&mut self) {
        self.enter(AnimationMode::Idle);
    }

    // ── Breathing ─────────────────────────────────────────────

    /// (Re)start breathing from phase 0.
    pub fn start_breathing(&mut self, frequency: f32) {
        self.enter(AnimationMode::Breathing);
        self.breathing = AnimationState {
            enabled: true,
            phase: 0.0,
            frequency,
        };
    }

    /// Advance breathing by `dt` seconds and write the new level.
    ///
    /// Returns the duty written, or `None` when breathing is not running.
    pub fn tick(&mut self, pwm: &mut impl PwmPort, dt: f32) -> Result<Option<u8>> {
        if self.mode != AnimationMode::Breathing || !self.breathing.enabled {
            return Ok(None);
        }
        // Kept within one period so f32 resolution never stalls the wave.
        let period = 1.0 / self.breathing.frequency;
        self.breathing.phase = (self.breathing.phase + dt) % period;
        let duty = breathing_duty(self.breathing.frequency, self.breathing.phase);
        pwm.set_group(&self.channels, duty)?;
        Ok(Some(duty))
    }

    // ── Boot sequence ─────────────────────────────────────────

    /// Play the configured boot pattern to completion. Ends with every
    /// channel at zero and the animator idle.
    pub fn run_boot_sequence(
        &mut self,
        pwm: &mut impl PwmPort,
        delay: &mut impl DelayNs,
    ) -> Result<()> {
        self.enter(AnimationMode::BootSequence);
        let mut first_err = None;
        match self.boot_pattern {
            BootPattern::TrailSpin => self.trail_spin(pwm, delay, &mut first_err),
            BootPattern::Ramp => self.ramp(pwm, delay, &mut first_err),
        }
        note(&mut first_err, pwm.set_group(&self.channels, 0));
        self.enter(AnimationMode::Idle);
        first_err.map_or(Ok(()), Err)
    }

    fn trail_spin(
        &self,
        pwm: &mut impl PwmPort,
        delay: &mut impl DelayNs,
        first_err: &mut Option<Error>,
    ) {
        let p = self.trail;
        let n = self.channels.len();
        for _ in 0..p.rotations {
            for head in 0..n {
                for (idx, &ch) in self.channels.iter().enumerate() {
                    let duty = trail_duty(head, idx, n, p.head_duty, p.trail_step);
                    note(first_err, pwm.set_channel(ch, duty));
                }
                delay.delay_ms(p.hold_ms);
            }
        }

        // Closing fade-up and fade-down across every channel.
        for level in fade_levels(p.fade_step) {
            note(first_err, pwm.set_group(&self.channels, level));
            delay.delay_ms(p.fade_delay_ms);
        }
        for level in fade_levels(p.fade_step).rev() {
            note(first_err, pwm.set_group(&self.channels, level));
            delay.delay_ms(p.fade_delay_ms);
        }
    }

    fn ramp(&self, pwm: &mut impl PwmPort, delay: &mut impl DelayNs, first_err: &mut Option<Error>) {
        let p = self.ramp;
        note(first_err, pwm.set_group(&self.channels, 0));
        let up = fade_levels(p.step).skip(1);
        let down = fade_levels(p.step).rev().skip(1);
        for level in up.chain(down) {
            for &ch in &self.channels {
                note(first_err, pwm.set_channel(ch, level));
                delay.delay_ms(p.delay_ms);
            }
        }
    }

    // ── Confirmation blink ────────────────────────────────────

    /// Stop breathing, blink every channel `pulses` times, end dark and idle.
    ///
    /// The caller is responsible for restoring steady-state output.
    pub fn run_confirmation_blink(
        &mut self,
        pwm: &mut impl PwmPort,
        delay: &mut impl DelayNs,
    ) -> Result<()> {
        self.enter(AnimationMode::ConfirmationBlink);
        let p = self.blink;
        let mut first_err = None;
        note(&mut first_err, pwm.set_group(&self.channels, 0));
        for _ in 0..p.pulses {
            note(&mut first_err, pwm.set_group(&self.channels, p.duty));
            delay.delay_ms(p.on_ms);
            note(&mut first_err, pwm.set_group(&self.channels, 0));
            delay.delay_ms(p.off_ms);
        }
        self.enter(AnimationMode::Idle);
        first_err.map_or(Ok(()), Err)
    }
}

fn note(first_err: &mut Option<Error>, result: Result<()>) {
    if let Err(e) = result {
        if first_err.is_none() {
            warn!("animation: PWM write failed: {}", e);
        }
        first_err.get_or_insert(e);
    }
}

/// Breathing duty at `phase` seconds: `0.5 * (1 + sin(2π f t))` as a
/// whole percentage, then scaled to the duty range.
pub fn breathing_duty(frequency: f32, phase: f32) -> u8 {
    let wave = 0.5 * (1.0 + (TWO_PI * frequency * phase).sin());
    percent_to_duty((wave * 100.0).round().clamp(0.0, 100.0) as u8)
}

/// Duty of ring position `idx` while the head sits at `head`.
///
/// Distance is counted backwards from the head around the ring, so the
/// tail trails behind the direction of rotation.
pub fn trail_duty(head: usize, idx: usize, n: usize, head_duty: u8, trail_step: u8) -> u8 {
    let distance = (head + n - idx) % n;
    let drop = distance.saturating_mul(usize::from(trail_step));
    usize::from(head_duty).saturating_sub(drop) as u8
}

/// 0, step, 2·step, … up to and including 255.
fn fade_levels(step: u8) -> impl DoubleEndedIterator<Item = u8> {
    let step = usize::from(step.max(1));
    let top = 255 / step;
    let ends_on_max = 255 % step == 0;
    (0..=top)
        .map(move |i| (i * step) as u8)
        .chain((!ends_on_max).then_some(255))
}
