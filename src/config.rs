use crate::bridge::BridgeConfig;

/// Where the relay board sits and how to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    /// Which attached bridge to open.
    pub device_index: u32,
    /// 7-bit address of the TCA9548A.
    pub mux_address: u8,
    /// Mux channel the relay board hangs off.
    pub mux_channel: u8,
    /// 7-bit address of the MCP23017.
    pub expander_address: u8,
    /// Pause after switching the mux and after initializing the expander.
    pub settle_ms: u32,
    pub bridge: BridgeConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            mux_address: crate::dev::tca9548a::BASE_ADDRESS,
            mux_channel: 1,
            expander_address: crate::dev::mcp23017::BASE_ADDRESS,
            settle_ms: 50,
            bridge: BridgeConfig::default(),
        }
    }
}
