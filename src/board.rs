use crate::bridge::{BridgeConfig, SmbusBridge};
use crate::dev::mcp23017::Mcp23017;
use crate::dev::tca9548a::{MuxChannel, Tca9548a};
use crate::strategy::ReadStrategy;
use crate::{BoardConfig, BridgeI2c, BusError, Port, RelayIndex, ALL_OFF};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

/// An open connection to the relay board.
///
/// The session owns the bridge.  [`RelayBoard::open()`] leaves every relay off and every line
/// configured as an output.  [`RelayBoard::close()`] (also run on drop) switches every relay off
/// again and closes the bridge.  A session is meant for one caller; nothing here is safe to
/// interleave.
pub struct RelayBoard<B, S, D>
where
    B: SmbusBridge,
    S: ReadStrategy,
    D: DelayNs,
{
    expander: Option<Mcp23017<BridgeI2c<B, S, D>>>,
    mux: Tca9548a,
    settle_ms: u32,
}

impl<B, S, D> RelayBoard<B, S, D>
where
    B: SmbusBridge,
    S: ReadStrategy,
    D: DelayNs,
{
    /// Open the bridge, select the mux channel and initialize the expander.
    ///
    /// If anything fails once the bridge is open, the session is closed again before the error
    /// is returned.
    pub fn open(
        mut bridge: B,
        strategy: S,
        delay: D,
        config: BoardConfig,
    ) -> Result<Self, BusError<B::Error>> {
        let channel = MuxChannel::new(config.mux_channel)
            .ok_or(BusError::InvalidChannel(config.mux_channel))?;
        bridge
            .open(config.device_index)
            .map_err(BusError::Transport)?;

        let bus = BridgeI2c::new(bridge, strategy, delay);
        let mut board = Self {
            expander: Some(Mcp23017::with_address(bus, config.expander_address)),
            mux: Tca9548a::with_address(config.mux_address),
            settle_ms: config.settle_ms,
        };

        if let Err(e) = board.bring_up(&config.bridge, channel) {
            warn!("relay board initialization failed: {}", e);
            if let Err(close_err) = board.close() {
                warn!("closing after failed initialization: {}", close_err);
            }
            return Err(e);
        }
        info!(
            "relay board initialized (mux channel {}, expander 0x{:02x})",
            channel.number(),
            config.expander_address
        );
        Ok(board)
    }

    fn bring_up(
        &mut self,
        bridge_config: &BridgeConfig,
        channel: MuxChannel,
    ) -> Result<(), BusError<B::Error>> {
        let mux = self.mux;
        let settle_ms = self.settle_ms;
        let expander = self.expander_mut()?;

        expander.bus_mut().configure(bridge_config)?;
        mux.select(expander.bus_mut(), channel)?;
        expander.bus_mut().delay_ms(settle_ms);
        expander.initialize()?;
        expander.bus_mut().delay_ms(settle_ms);
        Ok(())
    }

    fn expander_mut(&mut self) -> Result<&mut Mcp23017<BridgeI2c<B, S, D>>, BusError<B::Error>> {
        self.expander.as_mut().ok_or(BusError::Closed)
    }

    fn expander(&self) -> Result<&Mcp23017<BridgeI2c<B, S, D>>, BusError<B::Error>> {
        self.expander.as_ref().ok_or(BusError::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.expander
            .as_ref()
            .map_or(false, |expander| expander.bus().is_open())
    }

    /// Switch relay `index` (1-16) on or off.
    ///
    /// On failure the cached port value is left as it was, so calling again is safe.
    pub fn set_relay(&mut self, index: u8, on: bool) -> Result<(), BusError<B::Error>> {
        let relay = RelayIndex::new(index).ok_or(BusError::InvalidRelay(index))?;
        self.expander_mut()?.set_relay(relay, on)
    }

    /// Whether relay `index` is on, going by what was last written.
    pub fn relay_is_on(&self, index: u8) -> Result<bool, BusError<B::Error>> {
        let relay = RelayIndex::new(index).ok_or(BusError::InvalidRelay(index))?;
        Ok(self.expander()?.is_on(relay))
    }

    /// Write all eight relays of a port at once (active-low).
    pub fn write_port(&mut self, port: Port, value: u8) -> Result<(), BusError<B::Error>> {
        self.expander_mut()?.write_port(port, value)
    }

    /// Read a port back from the expander.
    pub fn read_port(&mut self, port: Port) -> Result<u8, BusError<B::Error>> {
        self.expander_mut()?.read_port(port)
    }

    /// Cached value of a port.
    pub fn port_state(&self, port: Port) -> Result<u8, BusError<B::Error>> {
        Ok(self.expander()?.port_state(port))
    }

    /// Read a port back and compare it with `expected`.
    pub fn verify_port(&mut self, port: Port, expected: u8) -> Result<(), BusError<B::Error>> {
        let actual = self.read_port(port)?;
        if actual != expected {
            return Err(BusError::ValueMismatch { expected, actual });
        }
        Ok(())
    }

    /// Switch the mux to another channel and wait for the downstream bus to settle.
    pub fn select_channel(&mut self, channel: u8) -> Result<(), BusError<B::Error>> {
        let channel = MuxChannel::new(channel).ok_or(BusError::InvalidChannel(channel))?;
        let mux = self.mux;
        let settle_ms = self.settle_ms;
        let bus = self.expander_mut()?.bus_mut();
        mux.select(bus, channel)?;
        bus.delay_ms(settle_ms);
        Ok(())
    }

    /// Read the mux control register and check that exactly `channel` is connected.
    pub fn verify_channel(&mut self, channel: u8) -> Result<(), BusError<B::Error>> {
        let expected = MuxChannel::new(channel)
            .ok_or(BusError::InvalidChannel(channel))?
            .mask();
        let mux = self.mux;
        let actual = mux.selected(self.expander_mut()?.bus_mut())?;
        if actual != expected {
            return Err(BusError::ValueMismatch { expected, actual });
        }
        Ok(())
    }

    /// List the devices answering on the currently selected channel (the mux included).
    pub fn scan(&mut self) -> Result<heapless::Vec<u8, 112>, BusError<B::Error>> {
        Ok(crate::scan(self.expander_mut()?.bus_mut()))
    }

    /// Switch all relays off and close the bridge.
    ///
    /// Failures while switching the relays off are logged and otherwise ignored so the bridge
    /// still gets closed.  Calling this on a closed session does nothing.
    pub fn close(&mut self) -> Result<(), BusError<B::Error>> {
        let Some(mut expander) = self.expander.take() else {
            return Ok(());
        };
        if !expander.bus().is_open() {
            return Ok(());
        }

        for port in [Port::A, Port::B] {
            if let Err(e) = expander.write_port(port, ALL_OFF) {
                warn!("could not switch port {:?} off while closing: {}", port, e);
            }
        }
        let mut bus = expander.release();
        bus.close()?;
        info!("relay board closed");
        Ok(())
    }
}

impl<B, S, D> Drop for RelayBoard<B, S, D>
where
    B: SmbusBridge,
    S: ReadStrategy,
    D: DelayNs,
{
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("closing relay board failed: {}", e);
        }
    }
}
