//! Zigbee protocol bridge.
//!
//! The mesh stack itself (commissioning, ZCL attribute tables, reporting)
//! runs as an ESP-IDF component outside this crate. [`ZigbeeBridge`] is the
//! lamp-side half of the boundary:
//!
//! - it tracks whether the device is joined, from the stack's app signals;
//! - it implements [`ProtocolBridge`] so the sensor task can publish
//!   temperatures, which the stack glue collects with
//!   [`take_pending_report`](ZigbeeBridge::take_pending_report);
//! - on target, [`ffi`] exports the C entry points the stack glue calls.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, info, warn};

use crate::app::ports::ProtocolBridge;

/// Delay the stack glue should wait before a retried commissioning step.
pub const RETRY_DELAY_MS: u32 = 1000;

// esp_zb_app_signal_type_t values the lamp reacts to.
const SIG_SKIP_STARTUP: u32 = 0x01;
const SIG_LEAVE: u32 = 0x03;
const SIG_DEVICE_FIRST_START: u32 = 0x05;
const SIG_DEVICE_REBOOT: u32 = 0x06;
const SIG_STEERING: u32 = 0x0A;

/// App signal from the stack, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSignal {
    SkipStartup,
    /// First start or reboot finished.
    DeviceStarted { ok: bool, factory_new: bool },
    /// Network steering finished.
    Steering { ok: bool },
    Leave,
    Other(u32),
}

impl StackSignal {
    pub fn from_raw(signal: u32, ok: bool, factory_new: bool) -> Self {
        match signal {
            SIG_SKIP_STARTUP => Self::SkipStartup,
            SIG_DEVICE_FIRST_START | SIG_DEVICE_REBOOT => Self::DeviceStarted { ok, factory_new },
            SIG_STEERING => Self::Steering { ok },
            SIG_LEAVE => Self::Leave,
            other => Self::Other(other),
        }
    }
}

/// What the stack glue should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommissioningAction {
    None = 0,
    Initialize = 1,
    StartSteering = 2,
    /// Retry initialisation after [`RETRY_DELAY_MS`].
    RetryInitialize = 3,
    /// Retry steering after [`RETRY_DELAY_MS`].
    RetrySteering = 4,
}

/// Temperature Measurement `MeasuredValue`: hundredths of a degree,
/// saturating at the `i16` range.
pub fn encode_temperature(celsius: f32) -> i16 {
    (celsius * 100.0) as i16
}

pub struct ZigbeeBridge {
    joined: AtomicBool,
    pending_report: Mutex<CriticalSectionRawMutex, Cell<Option<i16>>>,
}

impl Default for ZigbeeBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ZigbeeBridge {
    pub const fn new() -> Self {
        Self {
            joined: AtomicBool::new(false),
            pending_report: Mutex::new(Cell::new(None)),
        }
    }

    /// Update the joined flag from an app signal and pick the next step.
    pub fn on_signal(&self, signal: StackSignal) -> CommissioningAction {
        match signal {
            StackSignal::SkipStartup => {
                info!("Zigbee: initialising stack");
                CommissioningAction::Initialize
            }
            StackSignal::DeviceStarted {
                ok: true,
                factory_new: true,
            } => {
                info!("Zigbee: factory-new, starting network steering");
                CommissioningAction::StartSteering
            }
            StackSignal::DeviceStarted {
                ok: true,
                factory_new: false,
            } => {
                info!("Zigbee: rebooted into existing network");
                self.joined.store(true, Ordering::Release);
                CommissioningAction::None
            }
            StackSignal::DeviceStarted { ok: false, .. } => {
                warn!("Zigbee: stack start failed, retrying");
                CommissioningAction::RetryInitialize
            }
            StackSignal::Steering { ok: true } => {
                info!("Zigbee: joined network");
                self.joined.store(true, Ordering::Release);
                CommissioningAction::None
            }
            StackSignal::Steering { ok: false } => {
                info!("Zigbee: steering unsuccessful, retrying");
                CommissioningAction::RetrySteering
            }
            StackSignal::Leave => {
                warn!("Zigbee: left network");
                self.joined.store(false, Ordering::Release);
                CommissioningAction::None
            }
            StackSignal::Other(sig) => {
                debug!("Zigbee: signal 0x{:X} ignored", sig);
                CommissioningAction::None
            }
        }
    }

    /// Latest encoded temperature not yet written into the attribute table.
    pub fn take_pending_report(&self) -> Option<i16> {
        self.pending_report.lock(|cell| cell.take())
    }
}

impl ProtocolBridge for ZigbeeBridge {
    fn is_joined(&self) -> bool {
        self.joined.load(Ordering::Acquire)
    }

    fn report_temperature(&self, celsius: f32) {
        let value = encode_temperature(celsius);
        self.pending_report.lock(|cell| cell.set(Some(value)));
        debug!("Zigbee: MeasuredValue <- {}", value);
    }
}

// ── C entry points for the stack glue ─────────────────────────

#[cfg(target_os = "espidf")]
pub mod ffi {
    use std::sync::{Arc, Mutex, OnceLock};

    use super::{StackSignal, ZigbeeBridge};
    use crate::adapters::log_sink::LogEventSink;
    use crate::adapters::nvs::NvsStore;
    use crate::app::attributes::AttributeHandler;
    use crate::app::commands::AttributeValue;

    struct Hooks {
        bridge: Arc<ZigbeeBridge>,
        handler: Mutex<AttributeHandler<NvsStore>>,
    }

    static HOOKS: OnceLock<Hooks> = OnceLock::new();

    /// Register the bridge and attribute handler. Must run before the stack
    /// task starts; a second call is ignored and returns `false`.
    pub fn install(bridge: Arc<ZigbeeBridge>, handler: AttributeHandler<NvsStore>) -> bool {
        HOOKS
            .set(Hooks {
                bridge,
                handler: Mutex::new(handler),
            })
            .is_ok()
    }

    /// Set-attribute callback. Returns `true` if the lamp handled it.
    #[unsafe(no_mangle)]
    pub extern "C" fn lamp_zb_attribute_write(
        cluster: u16,
        attribute: u16,
        zcl_type: u8,
        raw: u32,
    ) -> bool {
        let Some(hooks) = HOOKS.get() else {
            return false;
        };
        let Some(value) = AttributeValue::from_zcl(zcl_type, raw) else {
            return false;
        };
        let Ok(mut handler) = hooks.handler.lock() else {
            return false;
        };
        handler.on_attribute_write(cluster, attribute, value, &mut LogEventSink::new())
    }

    /// App-signal callback. Returns a [`CommissioningAction`](super::CommissioningAction) code.
    #[unsafe(no_mangle)]
    pub extern "C" fn lamp_zb_signal(signal: u32, status: i32, factory_new: bool) -> u8 {
        HOOKS.get().map_or(0, |hooks| {
            hooks
                .bridge
                .on_signal(StackSignal::from_raw(signal, status == 0, factory_new)) as u8
        })
    }

    /// Fetch a pending temperature report into `out`.
    ///
    /// # Safety
    ///
    /// `out` must be valid for a single `i16` write.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn lamp_zb_take_temperature(out: *mut i16) -> bool {
        let Some(value) = HOOKS.get().and_then(|h| h.bridge.take_pending_report()) else {
            return false;
        };
        if out.is_null() {
            return false;
        }
        // SAFETY: caller guarantees `out` is writable; checked non-null.
        unsafe { out.write(value) };
        true
    }
}
