//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing lamp events to the ESP-IDF logger
//! (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::{LampEvent, SkipReason};
use crate::app::ports::EventSink;

/// Adapter that logs every [`LampEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LampEvent) {
        match event {
            LampEvent::Started { restored } => {
                info!(
                    "START | brightness={} mireds={}",
                    restored.brightness, restored.mireds
                );
            }
            LampEvent::PhaseChanged { from, to } => {
                info!("PHASE | {:?} -> {:?}", from, to);
            }
            LampEvent::OwnerChanged(owner) => {
                info!("OWNER | outputs -> {:?}", owner);
            }
            LampEvent::OutputApplied {
                amber,
                white,
                command,
                power_on,
            } => {
                info!(
                    "APPLY | amber={} white={} | brightness={} mireds={} | {}",
                    amber,
                    white,
                    command.brightness,
                    command.mireds,
                    if *power_on { "on" } else { "off" },
                );
            }
            LampEvent::CommandReceived(cmd) => {
                info!("CMD   | brightness={} mireds={}", cmd.brightness, cmd.mireds);
            }
            LampEvent::PowerChanged(on) => {
                info!("POWER | {}", if *on { "on" } else { "off" });
            }
            LampEvent::PersistFailed => {
                warn!("STORE | save failed, keeping in-memory state");
            }
            LampEvent::TemperatureReported { celsius } => {
                info!("SENSOR | reported {:.2}\u{00b0}C", celsius);
            }
            LampEvent::ReportSkipped(reason) => match reason {
                SkipReason::NoReading => warn!("SENSOR | no reading this cycle"),
                SkipReason::NotJoined => info!("SENSOR | not joined, report skipped"),
            },
        }
    }
}
