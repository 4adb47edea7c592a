//! The USB HID-to-SMBus bridge the board is reached through.
//!
//! The bridge is not driven directly by this crate.  Instead, whatever talks to the HID device
//! (vendor library, `hidapi`, ...) implements [`SmbusBridge`] and the rest of the crate is built on
//! top of it.  The methods map one-to-one onto the requests the bridge understands.
//!
//! Addresses passed to the bridge are in the 8-bit form (7-bit address shifted left by one), see
//! [`wire_address()`].

/// Convert a 7-bit I2C address into the left-shifted form the bridge expects.
pub const fn wire_address(address: u8) -> u8 {
    address << 1
}

/// Largest register-address prefix the bridge accepts for [`SmbusBridge::address_read_request`].
pub const MAX_TARGET_ADDRESS_LEN: usize = 16;

/// State reported by a transfer status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    Busy,
    Complete,
    Error,
}

/// Response to [`SmbusBridge::transfer_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferStatus {
    pub state: TransferState,
    /// Number of bytes the bridge has buffered for the current read.
    pub bytes_read: u16,
}

/// SMBus configuration of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// SCL clock rate in Hz.
    pub bit_rate_hz: u32,
    /// The bridge's own (8-bit) slave address.
    pub host_address: u8,
    /// Push read responses to the host without a force request.
    ///
    /// [`BridgeI2c::configure`](crate::BridgeI2c::configure) overrides this to match the read
    /// strategy in use.
    pub auto_read_respond: bool,
    pub write_timeout_ms: u16,
    pub read_timeout_ms: u16,
    /// Reset the bus when SCL is held low for more than 25ms.
    pub scl_low_timeout: bool,
    pub retry_count: u16,
    /// How long a single receive call blocks waiting for a read response.
    pub response_timeout_ms: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bit_rate_hz: 100_000,
            host_address: 0x02,
            auto_read_respond: false,
            write_timeout_ms: 1000,
            read_timeout_ms: 1000,
            scl_low_timeout: false,
            retry_count: 3,
            response_timeout_ms: 1000,
        }
    }
}

impl BridgeConfig {
    /// Short timeouts for probing many addresses in a row.
    pub const fn scan() -> Self {
        Self {
            bit_rate_hz: 100_000,
            host_address: 0x02,
            auto_read_respond: true,
            write_timeout_ms: 200,
            read_timeout_ms: 200,
            scl_low_timeout: false,
            retry_count: 2,
            response_timeout_ms: 200,
        }
    }
}

/// Requests understood by a HID-to-SMBus bridge (CP2112-style).
///
/// All methods block.  A single bridge must only be used by one caller at a time.
pub trait SmbusBridge {
    type Error: core::fmt::Debug;

    /// Open the `device_index`-th attached bridge.
    fn open(&mut self, device_index: u32) -> Result<(), Self::Error>;

    fn is_open(&self) -> bool;

    /// Set the USB-level response timeout.
    fn set_timeouts(&mut self, response_timeout_ms: u32) -> Result<(), Self::Error>;

    fn configure(&mut self, config: &BridgeConfig) -> Result<(), Self::Error>;

    fn write_request(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Start a plain read of `len` bytes.
    fn read_request(&mut self, address: u8, len: u16) -> Result<(), Self::Error>;

    /// Start a read of `len` bytes after writing `target` (register address) with a repeated
    /// start.
    fn address_read_request(
        &mut self,
        address: u8,
        len: u16,
        target: &[u8],
    ) -> Result<(), Self::Error>;

    fn transfer_status(&mut self) -> Result<TransferStatus, Self::Error>;

    /// Make the bridge send `len` buffered bytes to the host.  Only needed when auto read
    /// respond is off.
    fn force_read_response(&mut self, len: u16) -> Result<(), Self::Error>;

    /// Receive a read response into `buf`.
    ///
    /// Returns the number of bytes received, or `None` when nothing arrived within
    /// `timeout_ms`.
    fn read_response(&mut self, buf: &mut [u8], timeout_ms: u32)
        -> Result<Option<usize>, Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error>;
}
