//! Fuzz target: MS8607 PROM validation and temperature conversion
//!
//! Builds calibration words from arbitrary bytes. Anything that passes the
//! CRC must convert any 24-bit D2 sample without panicking.
//!
//! cargo fuzz run fuzz_calibration

#![no_main]

use cctlamp::sensors::prom::{CalibrationCoefficients, humidity_percent};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let words: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();

    let Ok(coeffs) = CalibrationCoefficients::from_words(&words) else {
        assert!(words.len() < 7);
        return;
    };
    if coeffs.verify().is_err() {
        return;
    }

    // At least 14 bytes were consumed by the PROM words.
    let d2 = u32::from_be_bytes([0, data[0], data[1], data[2]]);
    let celsius = coeffs.temperature_celsius(d2);
    assert!(celsius.is_finite());

    let rh = humidity_percent(coeffs.t_ref());
    assert!((-6.0..=119.0).contains(&rh));
});
