//! Shared lamp state.
//!
//! [`LampState`] is the single source of truth for the desired light output.
//! The protocol callback writes it, the LED task reads it. Both sides go
//! through a critical-section mutex around a `Copy` snapshot, so a reader
//! always sees a value produced by exactly one complete write.
//!
//! Every write bumps `revision`. The LED task compares revisions to decide
//! whether the mixer has work to do. The lock is held only for one copy.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Desired light output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampCommand {
    /// 0–255 overall intensity.
    pub brightness: u8,
    /// Colour temperature in mireds.
    pub mireds: u16,
}

/// Consistent view of the shared state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampSnapshot {
    pub command: LampCommand,
    pub power_on: bool,
    /// Incremented (wrapping) on every write.
    pub revision: u32,
}

impl LampSnapshot {
    /// Brightness the mixer should realise: zero while switched off.
    pub fn effective_brightness(&self) -> u8 {
        if self.power_on { self.command.brightness } else { 0 }
    }
}

pub struct LampState {
    inner: Mutex<CriticalSectionRawMutex, Cell<LampSnapshot>>,
}

impl LampState {
    /// Start powered on with `initial` at revision 0.
    pub const fn new(initial: LampCommand) -> Self {
        Self {
            inner: Mutex::new(Cell::new(LampSnapshot {
                command: initial,
                power_on: true,
                revision: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> LampSnapshot {
        self.inner.lock(Cell::get)
    }

    pub fn command(&self) -> LampCommand {
        self.snapshot().command
    }

    pub fn set_brightness(&self, brightness: u8) -> LampSnapshot {
        self.update(|s| s.command.brightness = brightness)
    }

    pub fn set_mireds(&self, mireds: u16) -> LampSnapshot {
        self.update(|s| s.command.mireds = mireds)
    }

    pub fn set_power(&self, on: bool) -> LampSnapshot {
        self.update(|s| s.power_on = on)
    }

    /// Replace both fields in one write.
    pub fn set_command(&self, command: LampCommand) -> LampSnapshot {
        self.update(|s| s.command = command)
    }

    fn update(&self, f: impl FnOnce(&mut LampSnapshot)) -> LampSnapshot {
        self.inner.lock(|cell| {
            let mut s = cell.get();
            f(&mut s);
            s.revision = s.revision.wrapping_add(1);
            cell.set(s);
            s
        })
    }
}
