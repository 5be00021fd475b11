//! Port traits: the hexagonal boundary between the lamp core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LampService / AttributeHandler / Reporter
//! ```
//!
//! Driven adapters (two-wire bus, PWM driver, key-value store, protocol
//! stack, event sinks) implement these traits. The domain consumes them via
//! generics, so nothing above this line touches hardware directly.

use crate::error::{BusError, Result, StoreError};

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: shared two-wire bus)
// ───────────────────────────────────────────────────────────────

/// Synchronous transactions on the shared sensor/LED bus.
///
/// Every call is a single transaction that either completes or returns a
/// definite error. Implementations never retry.
pub trait BusPort {
    /// Write `reg` followed by `bytes` in one transaction.
    /// An empty `bytes` sends a bare command byte.
    fn write(&mut self, addr: u8, reg: u8, bytes: &[u8]) -> core::result::Result<(), BusError>;

    /// Write `reg`, repeated start, then fill `out`.
    fn write_then_read(
        &mut self,
        addr: u8,
        reg: u8,
        out: &mut [u8],
    ) -> core::result::Result<(), BusError>;

    /// Plain receive with no preceding register write.
    fn read(&mut self, addr: u8, out: &mut [u8]) -> core::result::Result<(), BusError>;

    /// `true` if a device acknowledges `addr`.
    fn probe(&mut self, addr: u8) -> bool;
}

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: LED driver)
// ───────────────────────────────────────────────────────────────

/// Duty-cycle control of the LED outputs.
pub trait PwmPort {
    /// Write one duty register. Out-of-range channels fail with
    /// [`Error::InvalidArgument`](crate::error::Error::InvalidArgument)
    /// without any hardware access.
    fn set_channel(&mut self, channel: u8, duty: u8) -> Result<()>;

    /// Apply `duty` to every channel in `channels`, in order.
    ///
    /// Best-effort, not atomic: every channel is attempted even after a
    /// failure, nothing already written is rolled back, and the first error
    /// is returned.
    fn set_group(&mut self, channels: &[u8], duty: u8) -> Result<()> {
        let mut first_err = None;
        for &ch in channels {
            if let Err(e) = self.set_channel(ch, duty) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

// ───────────────────────────────────────────────────────────────
// Key-value store port (driven adapter: NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Durable key → i32 map. Writes become durable on [`commit`](Self::commit).
pub trait KeyValueStore {
    /// `Ok(None)` when the key has never been written.
    fn get_i32(&self, key: &str) -> core::result::Result<Option<i32>, StoreError>;

    fn set_i32(&mut self, key: &str, value: i32) -> core::result::Result<(), StoreError>;

    fn commit(&mut self) -> core::result::Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Protocol bridge port (driven adapter: mesh network stack)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the protocol bridge. The inbound half is
/// [`AttributeHandler`](super::attributes::AttributeHandler).
pub trait ProtocolBridge {
    /// `true` once the device has joined a network.
    fn is_joined(&self) -> bool;

    /// Publish a temperature measurement in degrees Celsius.
    fn report_temperature(&self, celsius: f32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`LampEvent`](super::events::LampEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LampEvent);
}
