//! Driver for a 16-relay board built from an `MCP23017` GPIO expander that sits behind a
//! `TCA9548A` I2C switch, reached through a USB HID-to-SMBus bridge.
//!
//! The bridge itself is abstracted by [`SmbusBridge`].  [`BridgeI2c`] turns a bridge into an
//! [`embedded_hal::i2c::I2c`] bus, fetching read responses with one of the [`ReadStrategy`]
//! implementations.  The chip drivers in [`dev`] work on any `I2c` bus, and [`RelayBoard`] ties
//! everything together into a session that is always left with all relays off.
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use relay_board::{strategy::Manual, BoardConfig, BusError, RelayBoard, SmbusBridge};
//!
//! fn click<B: SmbusBridge, D: DelayNs>(bridge: B, delay: D) -> Result<(), BusError<B::Error>> {
//!     let mut board = RelayBoard::open(bridge, Manual::default(), delay, BoardConfig::default())?;
//!     board.set_relay(1, true)?;
//!     board.set_relay(1, false)?;
//!     board.close()
//! }
//! ```
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

mod board;
pub mod bridge;
mod bus;
mod common;
mod config;
pub mod dev;
mod error;
mod relay;
pub mod strategy;

#[cfg(test)]
mod fake;

pub use board::RelayBoard;
pub use bridge::{BridgeConfig, SmbusBridge, TransferState, TransferStatus};
pub use bus::{scan, BridgeI2c, SCAN_RANGE};
pub use common::{Port, PortState, ALL_OFF};
pub use config::BoardConfig;
pub use error::BusError;
pub use relay::RelayIndex;
pub use strategy::{ReadMode, ReadStrategy};

pub use dev::mcp23017::Mcp23017;
pub use dev::tca9548a::{MuxChannel, Tca9548a};
