//! TC74 digital temperature sensor.
//!
//! One signed byte of whole degrees Celsius in register 0x00. The part can
//! power up in standby (config bit 7), in which case it is woken once at
//! init and given time to complete its first conversion.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::ports::BusPort;
use crate::error::Result;
use crate::pins::TC74_ADDR;

const REG_TEMP: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;
const CONFIG_STANDBY: u8 = 0x80;
/// Datasheet gives 200 ms from wake to first valid sample.
const WAKE_DELAY_MS: u32 = 250;

pub struct Tc74;

impl Tc74 {
    /// Read the config register and leave standby if needed.
    pub fn init(bus: &mut impl BusPort, delay: &mut impl DelayNs) -> Result<Self> {
        let mut cfg = [0u8; 1];
        bus.write_then_read(TC74_ADDR, REG_CONFIG, &mut cfg)?;

        if cfg[0] & CONFIG_STANDBY != 0 {
            info!("TC74: in standby (config=0x{:02X}), waking", cfg[0]);
            bus.write(TC74_ADDR, REG_CONFIG, &[0x00])?;
            delay.delay_ms(WAKE_DELAY_MS);
        }
        Ok(Self)
    }

    pub fn read_temperature(&self, bus: &mut impl BusPort) -> Result<i8> {
        let mut buf = [0u8; 1];
        bus.write_then_read(TC74_ADDR, REG_TEMP, &mut buf)?;
        Ok(buf[0] as i8)
    }
}
