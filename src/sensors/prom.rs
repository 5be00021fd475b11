//! MS8607 factory calibration and raw-count conversion.
//!
//! Pure functions only: nothing here touches the bus, so every formula can
//! be exercised against datasheet worked examples on the host.
//!
//! ## PROM layout (pressure/temperature die)
//!
//! | Word | Content                                   |
//! |------|-------------------------------------------|
//! | 0    | CRC-4 in bits 15..12, factory data below  |
//! | 1–4  | Pressure coefficients C1..C4              |
//! | 5    | C5, reference temperature `T_REF`         |
//! | 6    | C6, temperature coefficient `TEMPSENS`    |
//!
//! The CRC is computed over an 8-word frame whose 8th word is zero and whose
//! CRC nibble is masked out.

use crate::error::CalibrationError;

/// Data words held in the pressure/temperature PROM.
pub const PROM_WORDS: usize = 7;

const CRC4_POLY: u16 = 0x3000;
/// 0x131 with the implicit x^8 term dropped.
const CRC8_POLY: u8 = 0x31;
const RH_STATUS_MASK: u16 = 0x0003;

/// Factory calibration read once at init and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCoefficients {
    words: [u16; PROM_WORDS],
}

impl CalibrationCoefficients {
    /// Build from raw PROM words. Only the first [`PROM_WORDS`] are used.
    pub fn from_words(words: &[u16]) -> Result<Self, CalibrationError> {
        let words: [u16; PROM_WORDS] = words
            .get(..PROM_WORDS)
            .and_then(|w| w.try_into().ok())
            .ok_or(CalibrationError::Incomplete)?;
        Ok(Self { words })
    }

    pub fn words(&self) -> &[u16; PROM_WORDS] {
        &self.words
    }

    /// Nibble stored by the factory in the top bits of word 0.
    pub fn stored_crc(&self) -> u8 {
        (self.words[0] >> 12) as u8
    }

    pub fn computed_crc(&self) -> u8 {
        crc4(&self.words)
    }

    pub fn verify_checksum(&self) -> bool {
        self.stored_crc() == self.computed_crc()
    }

    /// `Ok` when the stored and computed nibbles agree.
    pub fn verify(&self) -> Result<(), CalibrationError> {
        let (stored, computed) = (self.stored_crc(), self.computed_crc());
        if stored == computed {
            Ok(())
        } else {
            Err(CalibrationError::ChecksumMismatch { stored, computed })
        }
    }

    /// C5: reference temperature.
    pub fn t_ref(&self) -> u16 {
        self.words[5]
    }

    /// C6: temperature coefficient of the temperature.
    pub fn temp_sens(&self) -> u16 {
        self.words[6]
    }

    /// First-order temperature in hundredths of a degree Celsius.
    ///
    /// `dT = D2 - C5 * 2^8`, `TEMP = 2000 + dT * C6 / 2^23`, integer
    /// arithmetic with truncation toward zero.
    pub fn temperature_centi(&self, d2: u32) -> i32 {
        let dt = i64::from(d2) - (i64::from(self.t_ref()) << 8);
        let temp = 2000 + dt * i64::from(self.temp_sens()) / (1 << 23);
        temp as i32
    }

    pub fn temperature_celsius(&self, d2: u32) -> f32 {
        self.temperature_centi(d2) as f32 / 100.0
    }
}

/// CRC-4 over the 7 PROM words (AN520 algorithm).
pub fn crc4(words: &[u16; PROM_WORDS]) -> u8 {
    let mut frame = [0u16; PROM_WORDS + 1];
    frame[..PROM_WORDS].copy_from_slice(words);
    frame[0] &= 0x0FFF;

    let mut rem: u16 = 0;
    for cnt in 0..frame.len() * 2 {
        let word = frame[cnt >> 1];
        rem ^= if cnt % 2 == 1 { word & 0x00FF } else { word >> 8 };
        for _ in 0..8 {
            rem = if rem & 0x8000 != 0 {
                (rem << 1) ^ CRC4_POLY
            } else {
                rem << 1
            };
        }
    }
    ((rem >> 12) & 0x000F) as u8
}

/// CRC-8 (x^8 + x^5 + x^4 + 1, init 0) used by the humidity die.
pub fn crc8(data: &[u8]) -> u8 {
    let mut rem: u8 = 0;
    for &byte in data {
        rem ^= byte;
        for _ in 0..8 {
            rem = if rem & 0x80 != 0 {
                (rem << 1) ^ CRC8_POLY
            } else {
                rem << 1
            };
        }
    }
    rem
}

/// Relative humidity from a raw humidity-die sample.
///
/// The two status bits are cleared before conversion.
pub fn humidity_percent(raw: u16) -> f32 {
    let raw = raw & !RH_STATUS_MASK;
    -6.0 + 125.0 * (f32::from(raw) / 65536.0)
}
