//! The device module contains the drivers for the chips on the relay board.
//!
//! Both are generic over [`embedded_hal::i2c::I2c`], so they work on the bridge adapter
//! ([`crate::BridgeI2c`]) as well as on any other I2C master.

pub mod mcp23017;
pub mod tca9548a;
