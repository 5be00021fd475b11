//! Outbound lamp events.
//!
//! Emitted by the LED task, the attribute handler and the reporter through
//! the [`EventSink`](super::ports::EventSink) port.

use crate::state::LampCommand;

use super::service::LampPhase;

/// Which side currently owns the PWM outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOwner {
    /// Status animations (boot, breathing, confirmation blink).
    Animation,
    /// Steady-state brightness / colour-temperature mixing.
    Mixer,
}

/// Structured events emitted by the lamp core.
#[derive(Debug, Clone, PartialEq)]
pub enum LampEvent {
    /// The LED task finished bring-up and entered its first phase.
    Started { restored: LampCommand },

    /// The LED task moved between lifecycle phases.
    PhaseChanged { from: LampPhase, to: LampPhase },

    /// Output ownership changed hands.
    OwnerChanged(OutputOwner),

    /// The mixer wrote new duties to the amber and white groups.
    OutputApplied { amber: u8, white: u8, command: LampCommand, power_on: bool },

    /// An attribute write updated the shared lamp state.
    CommandReceived(LampCommand),

    /// Power switched through the On/Off cluster.
    PowerChanged(bool),

    /// Saving the light state failed. In-memory state is kept.
    PersistFailed,

    /// A temperature was forwarded to the network.
    TemperatureReported { celsius: f32 },

    /// A report cycle produced nothing to forward.
    ReportSkipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoReading,
    NotJoined,
}
