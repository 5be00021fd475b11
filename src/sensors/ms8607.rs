//! MS8607 pressure/temperature/humidity combo sensor.
//!
//! Two dies on one package: the PT die (PROM-calibrated, 24-bit ADC) at
//! [`MS8607_PT_ADDR`] and the humidity die (HTU21D-compatible) at
//! [`MS8607_RH_ADDR`]. Only temperature and humidity are read.
//!
//! The driver holds the calibration words and borrows the bus per call, so
//! the sensor task keeps ownership of its bus handle.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::ports::BusPort;
use crate::error::{BusError, Result};
use crate::pins::{MS8607_PT_ADDR, MS8607_RH_ADDR};

use super::prom::{self, CalibrationCoefficients, PROM_WORDS};

// ── PT die commands ───────────────────────────────────────────

const CMD_RESET: u8 = 0x1E;
const CMD_ADC_READ: u8 = 0x00;
/// D2 (temperature) conversion at OSR 4096.
const CMD_CONVERT_D2_OSR4096: u8 = 0x58;
const CMD_PROM_BASE: u8 = 0xA0;

const RESET_DELAY_MS: u32 = 3;
/// Settle between a PROM command write and the receive.
const PROM_SETTLE_MS: u32 = 1;
/// OSR 4096 needs 8.22 ms worst case.
const CONVERSION_DELAY_MS: u32 = 10;

// ── Humidity die commands ─────────────────────────────────────

/// Trigger RH measurement, no-hold master.
const CMD_RH_MEASURE: u8 = 0xF5;
/// 12-bit RH needs 16 ms worst case.
const RH_CONVERSION_DELAY_MS: u32 = 20;

pub struct Ms8607 {
    coeffs: CalibrationCoefficients,
}

impl Ms8607 {
    /// Reset the PT die, read its PROM and verify the CRC.
    ///
    /// A CRC mismatch fails with [`CalibrationError`](crate::error::CalibrationError);
    /// no driver is created from untrusted coefficients.
    pub fn init(bus: &mut impl BusPort, delay: &mut impl DelayNs) -> Result<Self> {
        bus.write(MS8607_PT_ADDR, CMD_RESET, &[])?;
        delay.delay_ms(RESET_DELAY_MS);

        let coeffs = Self::read_calibration(bus, delay)?;
        coeffs.verify()?;
        info!(
            "MS8607: PROM ok (crc=0x{:X}, C5={}, C6={})",
            coeffs.stored_crc(),
            coeffs.t_ref(),
            coeffs.temp_sens()
        );
        Ok(Self { coeffs })
    }

    /// Build from already-trusted coefficients.
    pub fn with_calibration(coeffs: CalibrationCoefficients) -> Self {
        Self { coeffs }
    }

    /// Read the seven PROM words. Any failed word aborts the whole read.
    pub fn read_calibration(
        bus: &mut impl BusPort,
        delay: &mut impl DelayNs,
    ) -> Result<CalibrationCoefficients> {
        let mut words = [0u16; PROM_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            let cmd = CMD_PROM_BASE + (i as u8) * 2;
            bus.write(MS8607_PT_ADDR, cmd, &[])?;
            delay.delay_ms(PROM_SETTLE_MS);
            let mut buf = [0u8; 2];
            bus.read(MS8607_PT_ADDR, &mut buf)?;
            *word = u16::from_be_bytes(buf);
            debug!("MS8607: PROM[{}] = 0x{:04X}", i, *word);
        }
        Ok(CalibrationCoefficients::from_words(&words)?)
    }

    pub fn calibration(&self) -> &CalibrationCoefficients {
        &self.coeffs
    }

    /// Convert D2 and return degrees Celsius.
    pub fn read_temperature(
        &self,
        bus: &mut impl BusPort,
        delay: &mut impl DelayNs,
    ) -> Result<f32> {
        bus.write(MS8607_PT_ADDR, CMD_CONVERT_D2_OSR4096, &[])?;
        delay.delay_ms(CONVERSION_DELAY_MS);

        let mut buf = [0u8; 3];
        bus.write_then_read(MS8607_PT_ADDR, CMD_ADC_READ, &mut buf)?;
        let d2 = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]);
        Ok(self.coeffs.temperature_celsius(d2))
    }

    /// Trigger an RH measurement and return percent relative humidity.
    ///
    /// A CRC-8 mismatch on the returned sample fails with
    /// [`BusError::Corrupted`].
    pub fn read_humidity(
        &self,
        bus: &mut impl BusPort,
        delay: &mut impl DelayNs,
    ) -> Result<f32> {
        bus.write(MS8607_RH_ADDR, CMD_RH_MEASURE, &[])?;
        delay.delay_ms(RH_CONVERSION_DELAY_MS);

        let mut buf = [0u8; 3];
        bus.read(MS8607_RH_ADDR, &mut buf)?;
        if prom::crc8(&buf[..2]) != buf[2] {
            return Err(BusError::Corrupted.into());
        }
        Ok(prom::humidity_percent(u16::from_be_bytes([buf[0], buf[1]])))
    }
}
