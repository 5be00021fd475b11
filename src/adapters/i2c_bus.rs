//! Shared I2C bus adapter.
//!
//! Implements [`BusPort`] over any `embedded_hal::i2c::I2c` controller. The
//! controller sits behind an `Arc<Mutex<_>>` so the LED task and the sensor
//! task can each hold a cloned handle; the lock is held for exactly one
//! transaction, which keeps register writes and PROM reads from interleaving
//! mid-frame without serialising whole sequences.

use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::i2c::{ErrorKind, I2c};
use heapless::Vec;
use log::info;

use crate::app::ports::BusPort;
use crate::error::BusError;

/// Largest register payload the lamp ever writes in one transaction.
const MAX_WRITE: usize = 16;

/// Lowest and highest non-reserved 7-bit addresses.
const SCAN_FIRST: u8 = 0x01;
const SCAN_LAST: u8 = 0x7E;

pub struct I2cBus<I> {
    inner: Arc<Mutex<I>>,
}

impl<I> Clone for I2cBus<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: I2c> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            inner: Arc::new(Mutex::new(i2c)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, I>, BusError> {
        self.inner.lock().map_err(|_| BusError::Other)
    }
}

fn map_err(e: &impl embedded_hal::i2c::Error) -> BusError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        ErrorKind::ArbitrationLoss => BusError::ArbitrationLoss,
        _ => BusError::Other,
    }
}

impl<I: I2c> BusPort for I2cBus<I> {
    fn write(&mut self, addr: u8, reg: u8, bytes: &[u8]) -> Result<(), BusError> {
        let mut frame: Vec<u8, { MAX_WRITE + 1 }> = Vec::new();
        frame.push(reg).map_err(|_| BusError::Other)?;
        frame
            .extend_from_slice(bytes)
            .map_err(|()| BusError::Other)?;
        self.lock()?.write(addr, &frame).map_err(|e| map_err(&e))
    }

    fn write_then_read(&mut self, addr: u8, reg: u8, out: &mut [u8]) -> Result<(), BusError> {
        self.lock()?
            .write_read(addr, &[reg], out)
            .map_err(|e| map_err(&e))
    }

    fn read(&mut self, addr: u8, out: &mut [u8]) -> Result<(), BusError> {
        self.lock()?.read(addr, out).map_err(|e| map_err(&e))
    }

    fn probe(&mut self, addr: u8) -> bool {
        self.lock().is_ok_and(|mut bus| bus.write(addr, &[]).is_ok())
    }
}

/// Probe every non-reserved address and log the ones that answer.
pub fn scan_bus(bus: &mut impl BusPort) -> Vec<u8, 128> {
    info!("I2C scan starting");
    let mut found = Vec::new();
    for addr in SCAN_FIRST..=SCAN_LAST {
        if bus.probe(addr) {
            info!("found device at 0x{:02X}", addr);
            let _ = found.push(addr);
        }
    }
    info!("I2C scan finished, {} device(s)", found.len());
    found
}
