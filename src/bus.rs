use crate::bridge::{wire_address, BridgeConfig, SmbusBridge, MAX_TARGET_ADDRESS_LEN};
use crate::strategy::ReadStrategy;
use crate::BusError;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self as hal_i2c, I2c, Operation};
use log::debug;

/// Register access helpers for devices with an 8-bit register pointer.
pub(crate) trait I2cExt {
    type Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
}

impl<I2C: I2c> I2cExt for I2C {
    type Error = I2C::Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        self.write(addr, &[reg.into(), value])?;
        Ok(())
    }

    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(buf[0])
    }
}

/// [`I2c`] implementation on top of a HID-to-SMBus bridge.
///
/// Writes become write requests.  Reads become read requests (or address-read requests when
/// preceded by a register write) whose response is collected by the read strategy `S`.  The
/// bridge cannot do arbitrary repeated-start sequences, so only `[Write]`, `[Read]` and
/// `[Write, Read]` transactions are accepted.
///
/// Addresses on this side are plain 7-bit addresses; the shift happens here.
pub struct BridgeI2c<B, S, D> {
    bridge: B,
    strategy: S,
    delay: D,
}

impl<B, S, D> BridgeI2c<B, S, D>
where
    B: SmbusBridge,
    S: ReadStrategy,
    D: DelayNs,
{
    pub fn new(bridge: B, strategy: S, delay: D) -> Self {
        Self {
            bridge,
            strategy,
            delay,
        }
    }

    /// Push timeouts and SMBus settings to the bridge.
    ///
    /// `auto_read_respond` is taken from the strategy, not from `config`.  The strategy in turn
    /// picks up `response_timeout_ms` for its receive calls.
    pub fn configure(&mut self, config: &BridgeConfig) -> Result<(), BusError<B::Error>> {
        let config = BridgeConfig {
            auto_read_respond: self.strategy.auto_read_respond(),
            ..*config
        };
        self.strategy
            .set_response_timeout(config.response_timeout_ms);
        self.bridge
            .set_timeouts(config.response_timeout_ms)
            .map_err(BusError::Transport)?;
        self.bridge
            .configure(&config)
            .map_err(BusError::Transport)?;
        debug!("bridge configured: {:?}", config);
        Ok(())
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub fn is_open(&self) -> bool {
        self.bridge.is_open()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn close(&mut self) -> Result<(), BusError<B::Error>> {
        self.bridge.close().map_err(BusError::Transport)
    }

    pub fn release(self) -> (B, S, D) {
        (self.bridge, self.strategy, self.delay)
    }

    fn write_bytes(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError<B::Error>> {
        self.bridge
            .write_request(wire_address(address), bytes)
            .map_err(BusError::WriteFailed)
    }

    fn read_bytes(
        &mut self,
        address: u8,
        target: Option<&[u8]>,
        buf: &mut [u8],
    ) -> Result<(), BusError<B::Error>> {
        let len = u16::try_from(buf.len()).map_err(|_| BusError::Unsupported)?;
        if len == 0 {
            return Err(BusError::Unsupported);
        }
        match target {
            Some(target) => {
                if target.is_empty() || target.len() > MAX_TARGET_ADDRESS_LEN {
                    return Err(BusError::Unsupported);
                }
                self.bridge
                    .address_read_request(wire_address(address), len, target)
                    .map_err(BusError::Transport)?;
            }
            None => self
                .bridge
                .read_request(wire_address(address), len)
                .map_err(BusError::Transport)?,
        }

        let n = self
            .strategy
            .receive(&mut self.bridge, &mut self.delay, buf)?;
        if n < buf.len() {
            return Err(BusError::NoData);
        }
        Ok(())
    }
}

impl<B, S, D> hal_i2c::ErrorType for BridgeI2c<B, S, D>
where
    B: SmbusBridge,
{
    type Error = BusError<B::Error>;
}

impl<B, S, D> I2c for BridgeI2c<B, S, D>
where
    B: SmbusBridge,
    S: ReadStrategy,
    D: DelayNs,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        match operations {
            [Operation::Write(bytes)] => self.write_bytes(address, bytes),
            [Operation::Read(buf)] => self.read_bytes(address, None, buf),
            [Operation::Write(target), Operation::Read(buf)] => {
                self.read_bytes(address, Some(*target), buf)
            }
            _ => Err(BusError::Unsupported),
        }
    }
}

/// Lowest and highest address probed by [`scan()`]; the rest are reserved.
pub const SCAN_RANGE: core::ops::RangeInclusive<u8> = 0x08..=0x77;

/// Probe every non-reserved 7-bit address with a one-byte read.
///
/// Any error counts as "nobody there".
pub fn scan<I: I2c>(i2c: &mut I) -> heapless::Vec<u8, 112> {
    let mut found = heapless::Vec::new();
    for address in SCAN_RANGE {
        let mut buf = [0x00];
        if i2c.read(address, &mut buf).is_ok() {
            debug!("scan: device at 0x{:02x}", address);
            // The range has exactly 112 addresses, so this cannot overflow.
            let _ = found.push(address);
        }
    }
    found
}
