//! Persistent light state.
//!
//! Brightness and colour temperature are packed into one `i32` under a
//! single key, so one `set_i32` + `commit` writes both or neither:
//!
//! ```text
//!   bits 23..8  mireds
//!   bits  7..0  brightness
//! ```

use log::{info, warn};

use crate::app::ports::KeyValueStore;
use crate::config::LampConfig;
use crate::error::Result;
use crate::state::LampCommand;

/// NVS namespace holding the light state.
pub const NAMESPACE: &str = "storage";
pub const KEY: &str = "light_state";

pub fn pack(cmd: LampCommand) -> i32 {
    (i32::from(cmd.mireds) << 8) | i32::from(cmd.brightness)
}

/// `None` if `raw` could not have been produced by [`pack`] or carries a
/// zero colour temperature.
pub fn unpack(raw: i32) -> Option<LampCommand> {
    if raw < 0 || raw >> 24 != 0 {
        return None;
    }
    let mireds = (raw >> 8) as u16;
    if mireds == 0 {
        return None;
    }
    Some(LampCommand {
        brightness: (raw & 0xFF) as u8,
        mireds,
    })
}

/// Command used before anything has been saved.
pub fn default_command(config: &LampConfig) -> LampCommand {
    LampCommand {
        brightness: config.default_brightness,
        mireds: config.default_mireds,
    }
}

pub struct LightStateStore<S> {
    store: S,
    default: LampCommand,
}

impl<S: KeyValueStore> LightStateStore<S> {
    pub fn new(store: S, default: LampCommand) -> Self {
        Self { store, default }
    }

    /// Last saved command, or the default if none is usable.
    pub fn load(&self) -> LampCommand {
        match self.store.get_i32(KEY) {
            Ok(Some(raw)) => match unpack(raw) {
                Some(cmd) => {
                    info!(
                        "light state restored: brightness={} mireds={}",
                        cmd.brightness, cmd.mireds
                    );
                    cmd
                }
                None => {
                    warn!("light state 0x{:08X} unreadable, using default", raw);
                    self.default
                }
            },
            Ok(None) => {
                info!("no saved light state, using default");
                self.default
            }
            Err(e) => {
                warn!("light state read failed ({}), using default", e);
                self.default
            }
        }
    }

    /// Durably write both fields together.
    pub fn save(&mut self, cmd: LampCommand) -> Result<()> {
        self.store.set_i32(KEY, pack(cmd))?;
        self.store.commit()?;
        Ok(())
    }

    pub fn backend(&self) -> &S {
        &self.store
    }
}
