//! Unified error types for the lamp firmware.
//!
//! A single `Error` enum that every subsystem converts into. All variants are
//! `Copy` so they can be logged and passed between the LED task, the sensor
//! task and the protocol callback without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the lamp core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A two-wire bus transaction failed.
    Bus(BusError),
    /// Out-of-range channel index or parameter. No hardware was touched.
    InvalidArgument(&'static str),
    /// Sensor factory calibration could not be trusted.
    Calibration(CalibrationError),
    /// The persistence backend refused a read or write.
    Store(StoreError),
    /// A control line (LED power, LED reset) could not be driven.
    Gpio,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Calibration(e) => write!(f, "calibration: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Gpio => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// Address or data byte was not acknowledged.
    Nack,
    /// Another master won arbitration.
    ArbitrationLoss,
    /// The transaction did not complete in time.
    Timeout,
    /// The transfer completed but its payload failed an integrity check.
    Corrupted,
    /// Any other controller-level failure.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::ArbitrationLoss => write!(f, "arbitration lost"),
            Self::Timeout => write!(f, "timeout"),
            Self::Corrupted => write!(f, "payload CRC mismatch"),
            Self::Other => write!(f, "controller error"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Calibration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The CRC-4 computed over the PROM words disagrees with the stored nibble.
    ChecksumMismatch { stored: u8, computed: u8 },
    /// Fewer PROM words than required were supplied.
    Incomplete,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "PROM CRC mismatch (stored=0x{stored:X}, computed=0x{computed:X})"
            ),
            Self::Incomplete => write!(f, "incomplete PROM read"),
        }
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Backend I/O failure (flash, handle open, commit).
    Io,
    /// Partition has no free pages.
    Full,
    /// A stored value exists but cannot be decoded.
    Corrupted,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Full => write!(f, "storage full"),
            Self::Corrupted => write!(f, "stored value corrupted"),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
