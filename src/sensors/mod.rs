//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the sensor task's bus handle and delay and produces a
//! [`SensorSnapshot`] per report cycle. An enabled sensor whose init failed
//! is tried again at the start of every cycle until it comes up.

pub mod ms8607;
pub mod prom;
pub mod tc74;

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::app::ports::BusPort;
use crate::config::LampConfig;
use ms8607::Ms8607;
use tc74::Tc74;

/// One report cycle worth of readings. `None` means that read failed or the
/// sensor is absent; there is no sentinel value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub ms8607_celsius: Option<f32>,
    pub humidity_percent: Option<f32>,
    pub tc74_celsius: Option<i8>,
}

impl SensorSnapshot {
    /// Preferred temperature for reporting: the calibrated MS8607 reading,
    /// else the TC74.
    pub fn temperature(&self) -> Option<f32> {
        self.ms8607_celsius
            .or_else(|| self.tc74_celsius.map(f32::from))
    }
}

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub<B, D> {
    bus: B,
    delay: D,
    ms8607_enabled: bool,
    tc74_enabled: bool,
    ms8607: Option<Ms8607>,
    tc74: Option<Tc74>,
}

impl<B: BusPort, D: DelayNs> SensorHub<B, D> {
    /// Initialise every sensor enabled in `config`.
    ///
    /// A sensor that fails init is logged and left out for now; the others
    /// still run.
    pub fn new(bus: B, delay: D, config: &LampConfig) -> Self {
        let mut hub = Self {
            bus,
            delay,
            ms8607_enabled: config.ms8607_enabled,
            tc74_enabled: config.tc74_enabled,
            ms8607: None,
            tc74: None,
        };
        hub.init_missing();
        hub
    }

    fn init_missing(&mut self) {
        if self.ms8607_enabled && self.ms8607.is_none() {
            self.ms8607 = Ms8607::init(&mut self.bus, &mut self.delay)
                .inspect_err(|e| warn!("MS8607 init failed: {}", e))
                .ok();
        }
        if self.tc74_enabled && self.tc74.is_none() {
            self.tc74 = Tc74::init(&mut self.bus, &mut self.delay)
                .inspect_err(|e| warn!("TC74 init failed: {}", e))
                .ok();
        }
    }

    pub fn has_ms8607(&self) -> bool {
        self.ms8607.is_some()
    }

    pub fn has_tc74(&self) -> bool {
        self.tc74.is_some()
    }

    /// Retry any missing sensor, then read every initialised one.
    ///
    /// Individual read failures are logged and reported as `None`, so one
    /// flaky sensor never poisons the rest of the snapshot.
    pub fn read_all(&mut self) -> SensorSnapshot {
        self.init_missing();
        let mut snap = SensorSnapshot::default();

        if let Some(ms) = &self.ms8607 {
            snap.ms8607_celsius = ms
                .read_temperature(&mut self.bus, &mut self.delay)
                .inspect_err(|e| warn!("MS8607 temperature read failed: {}", e))
                .ok();
            snap.humidity_percent = ms
                .read_humidity(&mut self.bus, &mut self.delay)
                .inspect_err(|e| warn!("MS8607 humidity read failed: {}", e))
                .ok();
        }
        if let Some(tc) = &self.tc74 {
            snap.tc74_celsius = tc
                .read_temperature(&mut self.bus)
                .inspect_err(|e| warn!("TC74 read failed: {}", e))
                .ok();
        }
        snap
    }
}
