//! Protocol-side entry point for attribute writes.
//!
//! Runs in the protocol stack's callback context. It only updates the shared
//! [`LampState`] and persists the result; the LED task notices the new
//! revision on its next tick and drives the outputs. Nothing here touches the
//! PWM driver.

use std::sync::Arc;

use log::{debug, info, warn};

use super::commands::{AttributeValue, AttributeWrite};
use super::events::LampEvent;
use super::light_store::LightStateStore;
use super::ports::{EventSink, KeyValueStore};
use crate::state::LampState;

pub struct AttributeHandler<S> {
    state: Arc<LampState>,
    store: LightStateStore<S>,
}

impl<S: KeyValueStore> AttributeHandler<S> {
    pub fn new(state: Arc<LampState>, store: LightStateStore<S>) -> Self {
        Self { state, store }
    }

    /// Decode and apply a raw attribute write. Returns `false` for pairs the
    /// lamp does not handle.
    pub fn on_attribute_write(
        &mut self,
        cluster: u16,
        attribute: u16,
        value: AttributeValue,
        sink: &mut impl EventSink,
    ) -> bool {
        match AttributeWrite::decode(cluster, attribute, value) {
            Some(write) => {
                self.apply(write, sink);
                true
            }
            None => {
                debug!(
                    "ignored attribute write: cluster=0x{:04X} attr=0x{:04X} value={:?}",
                    cluster, attribute, value
                );
                false
            }
        }
    }

    pub fn apply(&mut self, write: AttributeWrite, sink: &mut impl EventSink) {
        let snap = match write {
            // Power is not persisted: the lamp always boots lit.
            AttributeWrite::OnOff(on) => {
                info!("light switched {}", if on { "on" } else { "off" });
                self.state.set_power(on);
                sink.emit(&LampEvent::PowerChanged(on));
                return;
            }
            AttributeWrite::Level(level) => {
                info!("level -> {}", level);
                self.state.set_brightness(level)
            }
            AttributeWrite::ColorTemperature(mireds) => {
                info!("colour temperature -> {} mireds", mireds);
                self.state.set_mireds(mireds)
            }
        };
        sink.emit(&LampEvent::CommandReceived(snap.command));

        if let Err(e) = self.store.save(snap.command) {
            warn!("light state not saved ({}), keeping in-memory state", e);
            sink.emit(&LampEvent::PersistFailed);
        }
    }

    pub fn store(&self) -> &LightStateStore<S> {
        &self.store
    }
}
