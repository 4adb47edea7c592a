//! Support for the `TCA9548A` "Low-Voltage 8-Channel I2C Switch"
//!
//! Datasheet: https://www.ti.com/lit/ds/symlink/tca9548a.pdf
//!
//! The switch has a single control register; each bit connects one downstream bus.  This driver
//! only ever connects one channel at a time.  After switching, give the downstream bus a few tens
//! of milliseconds before talking to devices on it.
//!
//! The switch does not hold a bus itself, every call borrows the I2C bus it sits on.
use embedded_hal::i2c::I2c;
use log::debug;

/// Address with all strap pins tied low.
pub const BASE_ADDRESS: u8 = 0x70;

/// One of the eight downstream buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxChannel(u8);

impl MuxChannel {
    pub const COUNT: u8 = 8;

    /// Returns `None` for anything outside `0..=7`.
    pub const fn new(channel: u8) -> Option<Self> {
        if channel < Self::COUNT {
            Some(Self(channel))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    /// Control register value connecting only this channel.
    pub const fn mask(self) -> u8 {
        1 << self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tca9548a {
    addr: u8,
}

impl Tca9548a {
    pub const fn new(a0: bool, a1: bool, a2: bool) -> Self {
        Self::with_address(BASE_ADDRESS | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8))
    }

    pub const fn with_address(addr: u8) -> Self {
        Self { addr }
    }

    pub const fn address(&self) -> u8 {
        self.addr
    }

    /// Connect `channel` and disconnect all others.  Nothing is read back.
    pub fn select<I2C: I2c>(&self, i2c: &mut I2C, channel: MuxChannel) -> Result<(), I2C::Error> {
        i2c.write(self.addr, &[channel.mask()])?;
        debug!("tca9548a at 0x{:02x}: channel {} selected", self.addr, channel.0);
        Ok(())
    }

    /// Read the control register.
    pub fn selected<I2C: I2c>(&self, i2c: &mut I2C) -> Result<u8, I2C::Error> {
        let mut buf = [0x00];
        i2c.read(self.addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Disconnect every downstream bus.
    pub fn disconnect<I2C: I2c>(&self, i2c: &mut I2C) -> Result<(), I2C::Error> {
        i2c.write(self.addr, &[0x00])
    }
}

impl Default for Tca9548a {
    fn default() -> Self {
        Self::with_address(BASE_ADDRESS)
    }
}
