//! GPIO / bus assignments for the lamp controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers or device addresses.

// ---------------------------------------------------------------------------
// Shared two-wire bus
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 6;
pub const I2C_SCL_GPIO: i32 = 7;
/// Standard-mode clock. The TLC59108 and TC74 are both rated for it.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// LED driver (TLC59108, 8-channel constant-current PWM sink)
// ---------------------------------------------------------------------------

/// Digital output: enables the LED driver supply (active HIGH).
pub const LED_POWER_GPIO: i32 = 10;
/// Digital output: TLC59108 RESET (active LOW). Held HIGH in normal operation.
pub const LED_RESET_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// 7-bit bus addresses
// ---------------------------------------------------------------------------

pub const TLC59108_ADDR: u8 = 0x40;
pub const TC74_ADDR: u8 = 0x4C;
/// MS8607 pressure/temperature die.
pub const MS8607_PT_ADDR: u8 = 0x76;
/// MS8607 humidity die. Shares 0x40 with the TLC59108 on this board revision.
pub const MS8607_RH_ADDR: u8 = 0x40;
