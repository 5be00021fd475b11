//! TLC59108 8-channel PWM LED sink driver.
//!
//! Register map (auto-increment unused, one register per transaction):
//!
//! | Reg       | Addr        | Value at bring-up                       |
//! |-----------|-------------|-----------------------------------------|
//! | MODE1     | 0x00        | 0x00: oscillator on, normal mode        |
//! | MODE2     | 0x01        | 0x20: push-pull (totem-pole), no invert |
//! | PWM0..7   | 0x02..=0x09 | 0x00                                    |
//! | LEDOUT0/1 | 0x0C / 0x0D | 0xAA: every output under PWMx control   |
//!
//! The driver owns its bus handle and the LED supply enable line. Only the
//! LED task holds one, which makes it the single writer of the duty registers.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::{BusPort, PwmPort};
use crate::config::CHANNEL_COUNT;
use crate::error::{Error, Result};

const REG_MODE1: u8 = 0x00;
const REG_MODE2: u8 = 0x01;
const REG_PWM0: u8 = 0x02;
const REG_LEDOUT0: u8 = 0x0C;
const REG_LEDOUT1: u8 = 0x0D;
/// Last register covered by [`Tlc59108::dump_registers`].
const REG_LAST: u8 = REG_LEDOUT1;

const MODE1_NORMAL: u8 = 0x00;
const MODE2_TOTEM_POLE: u8 = 0x20;
const LEDOUT_ALL_PWM: u8 = 0xAA;

/// Supply settle time after asserting the power enable.
const POWER_SETTLE_MS: u32 = 20;
/// Datasheet minimum RESET low time is 500 ns; 1 ms is the tick floor.
const RESET_PULSE_MS: u32 = 1;

/// Convert 0–100 % to a 0–255 duty, rounding to nearest.
/// Values above 100 saturate at full duty.
pub fn percent_to_duty(pct: u8) -> u8 {
    let pct = u16::from(pct.min(100));
    ((pct * 255 + 50) / 100) as u8
}

/// Pulse the active-low RESET line and leave it released (HIGH).
pub fn reset_pulse(reset: &mut impl OutputPin, delay: &mut impl DelayNs) -> Result<()> {
    reset.set_low().map_err(|_| Error::Gpio)?;
    delay.delay_ms(RESET_PULSE_MS);
    reset.set_high().map_err(|_| Error::Gpio)?;
    delay.delay_ms(RESET_PULSE_MS);
    Ok(())
}

pub struct Tlc59108<B, P> {
    bus: B,
    power: P,
    addr: u8,
}

impl<B: BusPort, P: OutputPin> Tlc59108<B, P> {
    pub fn new(bus: B, power: P, addr: u8) -> Self {
        Self { bus, power, addr }
    }

    /// Power up and program the device; every duty register ends at zero.
    ///
    /// Nothing may drive the outputs before this returns `Ok`.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        self.power.set_high().map_err(|_| Error::Gpio)?;
        delay.delay_ms(POWER_SETTLE_MS);

        self.write_reg(REG_MODE1, MODE1_NORMAL)?;
        self.write_reg(REG_MODE2, MODE2_TOTEM_POLE)?;
        self.write_reg(REG_LEDOUT0, LEDOUT_ALL_PWM)?;
        self.write_reg(REG_LEDOUT1, LEDOUT_ALL_PWM)?;
        for ch in 0..CHANNEL_COUNT {
            self.write_reg(REG_PWM0 + ch, 0)?;
        }
        info!("TLC59108: initialised at 0x{:02X}", self.addr);
        Ok(())
    }

    /// [`init`](Self::init), and on failure pulse `reset` and try once more.
    ///
    /// An `Err` leaves the device unprogrammed; the caller must not start
    /// any output until a later call succeeds.
    pub fn bring_up(
        &mut self,
        reset: &mut impl OutputPin,
        delay: &mut impl DelayNs,
    ) -> Result<()> {
        if let Err(e) = self.init(delay) {
            warn!("TLC59108: init failed ({}), pulsing reset", e);
            reset_pulse(reset, delay)?;
            self.init(delay)?;
        }
        Ok(())
    }

    pub fn set_all(&mut self, duty: u8) -> Result<()> {
        let all: [u8; CHANNEL_COUNT as usize] = core::array::from_fn(|i| i as u8);
        self.set_group(&all, duty)
    }

    pub fn set_all_percent(&mut self, pct: u8) -> Result<()> {
        self.set_all(percent_to_duty(pct))
    }

    /// Read and log MODE1..LEDOUT1. Failed reads are logged and left `None`.
    pub fn dump_registers(&mut self) -> [Option<u8>; REG_LAST as usize + 1] {
        let mut regs = [None; REG_LAST as usize + 1];
        info!("----- TLC59108 register dump -----");
        for (reg, slot) in regs.iter_mut().enumerate() {
            let mut buf = [0u8; 1];
            match self.bus.write_then_read(self.addr, reg as u8, &mut buf) {
                Ok(()) => {
                    info!("reg 0x{:02X} = 0x{:02X}", reg, buf[0]);
                    *slot = Some(buf[0]);
                }
                Err(e) => warn!("reg 0x{:02X} = <{}>", reg, e),
            }
        }
        regs
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<()> {
        self.bus.write(self.addr, reg, &[value]).map_err(|e| {
            warn!(
                "TLC59108: write failed reg=0x{:02X} val=0x{:02X}: {}",
                reg, value, e
            );
            Error::Bus(e)
        })
    }
}

impl<B: BusPort, P: OutputPin> PwmPort for Tlc59108<B, P> {
    fn set_channel(&mut self, channel: u8, duty: u8) -> Result<()> {
        if channel >= CHANNEL_COUNT {
            return Err(Error::InvalidArgument("PWM channel must be 0–7"));
        }
        self.write_reg(REG_PWM0 + channel, duty)
    }
}
