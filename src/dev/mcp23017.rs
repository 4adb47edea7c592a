//! Support for the `MCP23017` "16-Bit I/O Expander with Serial Interface" driving a relay board
//!
//! Datasheet: https://ww1.microchip.com/downloads/en/devicedoc/20001952c.pdf
//!
//! The MCP23017 offers two eight-bit GPIO ports.  It has three
//! address pins, so eight devices can coexist on an I2C bus.
//!
//! On the relay board every line is an output and drives one relay, active-low: port A carries
//! relays 1-8 and port B relays 9-16.  The driver keeps a copy of the last value successfully
//! written to each GPIO register and computes single-relay changes from that copy instead of
//! reading the port back.
use crate::bus::I2cExt;
use crate::{Port, PortState, RelayIndex, ALL_OFF};
use embedded_hal::i2c::I2c;
use log::debug;

/// Address with all strap pins tied low.
pub const BASE_ADDRESS: u8 = 0x20;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    // N.B.: These values are for BANK=0, which is the reset state of
    // the chip (and this driver does not change).
    //
    // IODIR{A,B} reset to 0xFF, making all pins inputs.  Everything
    // else resets to 0x00.
    //
    // IODIR: input/output direction: 0=output; 1=input
    // GPIO: reflects logic level on pins, writes go to OLAT
    // OLAT: output latches: sets state for pins configured as outputs
    IODIRA = 0x00,
    IODIRB = 0x01,
    GPIOA = 0x12,
    GPIOB = 0x13,
    OLATA = 0x14,
    OLATB = 0x15,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

impl Port {
    fn gpio(self) -> Regs {
        match self {
            Port::A => Regs::GPIOA,
            Port::B => Regs::GPIOB,
        }
    }

    fn iodir(self) -> Regs {
        match self {
            Port::A => Regs::IODIRA,
            Port::B => Regs::IODIRB,
        }
    }
}

/// `MCP23017` with sixteen relays attached.
pub struct Mcp23017<I2C> {
    i2c: I2C,
    addr: u8,
    state: PortState,
}

impl<I2C> Mcp23017<I2C> {
    /// Create a driver for the chip with the given strap pins.  Nothing is sent yet.
    pub fn new(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        let addr = BASE_ADDRESS | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Self::with_address(i2c, addr)
    }

    pub fn with_address(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            state: PortState::all_off(),
        }
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Last value successfully written to `port`.
    pub fn port_state(&self, port: Port) -> u8 {
        self.state.get(port)
    }

    pub fn state(&self) -> PortState {
        self.state
    }

    /// Whether `relay` is on, according to the cached port values.
    pub fn is_on(&self, relay: RelayIndex) -> bool {
        relay.is_on_in(self.state.get(relay.port()))
    }

    /// Forget what was written and assume everything is off again.
    pub fn reset_cache(&mut self) {
        self.state = PortState::all_off();
    }

    pub fn bus(&self) -> &I2C {
        &self.i2c
    }

    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Mcp23017<I2C> {
    /// Switch every relay off and make all sixteen lines outputs.
    ///
    /// The GPIO registers are written before the direction registers so no line is ever
    /// driven low (relay on) while switching to output.
    pub fn initialize(&mut self) -> Result<(), I2C::Error> {
        self.write_port(Port::A, ALL_OFF)?;
        self.write_port(Port::B, ALL_OFF)?;
        self.i2c.write_reg(self.addr, Port::A.iodir(), 0x00)?;
        self.i2c.write_reg(self.addr, Port::B.iodir(), 0x00)?;
        debug!("mcp23017 at 0x{:02x}: all outputs, all relays off", self.addr);
        Ok(())
    }

    /// Write a raw value to the port's GPIO register.  The cache only changes if the write
    /// went through.
    pub fn write_port(&mut self, port: Port, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write_reg(self.addr, port.gpio(), value)?;
        self.state.set(port, value);
        debug!("mcp23017 at 0x{:02x}: port {:?} <- 0x{:02x}", self.addr, port, value);
        Ok(())
    }

    /// Read the port's GPIO register from the chip.  The cache is not touched.
    pub fn read_port(&mut self, port: Port) -> Result<u8, I2C::Error> {
        self.i2c.read_reg(self.addr, port.gpio())
    }

    /// Switch a single relay, leaving the other fifteen as they are.
    ///
    /// The port is always written, even if the relay is already in the requested state.
    pub fn set_relay(&mut self, relay: RelayIndex, on: bool) -> Result<(), I2C::Error> {
        let port = relay.port();
        let value = relay.apply(self.state.get(port), on);
        self.write_port(port, value)
    }
}
