//! LED task service, the hexagonal core of the lamp.
//!
//! [`LampService`] owns the PWM driver, the animator and the mixer, and is
//! the only code that writes duty registers. Output ownership follows the
//! lamp's lifecycle:
//!
//! ```text
//!   Booting ──start()──▶ AwaitingNetwork ──joined──▶ Steady
//!   (boot sequence)      (breathing)       (blink)   (mixer)
//! ```
//!
//! The confirmation blink plays exactly once, on the first tick that sees
//! the network joined. From then on the animator stays idle and the mixer
//! follows [`LampState`], even if the network later drops.

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::LampConfig;
use crate::control::mixer::Mixer;
use crate::drivers::animation::Animator;
use crate::state::LampState;

use super::events::{LampEvent, OutputOwner};
use super::ports::{EventSink, PwmPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampPhase {
    /// Before [`LampService::start`].
    Booting,
    /// Breathing until the network is joined.
    AwaitingNetwork,
    /// The mixer owns the outputs.
    Steady,
}

pub struct LampService<P> {
    pwm: P,
    animator: Animator,
    mixer: Mixer,
    state: Arc<LampState>,
    phase: LampPhase,
    owner: OutputOwner,
    /// Revision the outputs currently reflect; `None` forces the next apply.
    applied_revision: Option<u32>,
    tick_secs: f32,
    breathing_hz: f32,
}

impl<P: PwmPort> LampService<P> {
    /// `pwm` must already be initialised with every duty at zero.
    pub fn new(pwm: P, state: Arc<LampState>, config: &LampConfig) -> Self {
        Self {
            pwm,
            animator: Animator::new(config),
            mixer: Mixer::new(config),
            state,
            phase: LampPhase::Booting,
            owner: OutputOwner::Animation,
            applied_revision: None,
            tick_secs: config.tick_secs(),
            breathing_hz: config.breathing_hz,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Play the boot sequence once, then start breathing.
    pub fn start(&mut self, delay: &mut impl DelayNs, sink: &mut impl EventSink) {
        if self.phase != LampPhase::Booting {
            warn!("LampService::start called twice, ignoring");
            return;
        }
        sink.emit(&LampEvent::Started {
            restored: self.state.command(),
        });

        if let Err(e) = self.animator.run_boot_sequence(&mut self.pwm, delay) {
            warn!("boot sequence incomplete: {}", e);
        }
        self.animator.start_breathing(self.breathing_hz);
        self.set_phase(LampPhase::AwaitingNetwork, sink);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One animation tick. `joined` is the protocol bridge's current view.
    pub fn tick(&mut self, joined: bool, delay: &mut impl DelayNs, sink: &mut impl EventSink) {
        match self.phase {
            LampPhase::Booting => {}
            LampPhase::AwaitingNetwork if joined => self.confirm_joined(delay, sink),
            LampPhase::AwaitingNetwork => {
                if let Err(e) = self.animator.tick(&mut self.pwm, self.tick_secs) {
                    warn!("breathing write failed: {}", e);
                }
            }
            LampPhase::Steady => self.apply_if_changed(sink),
        }
    }

    fn confirm_joined(&mut self, delay: &mut impl DelayNs, sink: &mut impl EventSink) {
        info!("network joined, handing outputs to the mixer");
        if let Err(e) = self.animator.run_confirmation_blink(&mut self.pwm, delay) {
            warn!("confirmation blink incomplete: {}", e);
        }
        self.owner = OutputOwner::Mixer;
        sink.emit(&LampEvent::OwnerChanged(OutputOwner::Mixer));
        self.set_phase(LampPhase::Steady, sink);

        // Recall whatever the state holds now (restored or already updated).
        self.applied_revision = None;
        self.apply_if_changed(sink);
    }

    fn apply_if_changed(&mut self, sink: &mut impl EventSink) {
        debug_assert_eq!(self.owner, OutputOwner::Mixer);
        let snap = self.state.snapshot();
        if self.applied_revision == Some(snap.revision) {
            return;
        }

        let brightness = snap.effective_brightness();
        let out = match self
            .mixer
            .apply(&mut self.pwm, brightness, snap.command.mireds)
        {
            Ok(out) => out,
            Err(e) => {
                warn!("mix applied partially: {}", e);
                self.mixer.compute(brightness, snap.command.mireds)
            }
        };
        // Marked applied even on a partial write; the next command retries.
        self.applied_revision = Some(snap.revision);
        sink.emit(&LampEvent::OutputApplied {
            amber: out.amber,
            white: out.white,
            command: snap.command,
            power_on: snap.power_on,
        });
    }

    fn set_phase(&mut self, to: LampPhase, sink: &mut impl EventSink) {
        let from = self.phase;
        self.phase = to;
        sink.emit(&LampEvent::PhaseChanged { from, to });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> LampPhase {
        self.phase
    }

    pub fn owner(&self) -> OutputOwner {
        self.owner
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
