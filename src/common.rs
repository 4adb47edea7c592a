/// Output value that switches every relay on a port off (relays are active-low).
pub const ALL_OFF: u8 = 0xff;

/// One of the two eight-bit GPIO ports of the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Relays 1 to 8.
    A,
    /// Relays 9 to 16.
    B,
}

/// Last values written to the two GPIO registers.
///
/// Bits are active-low: 0 means the relay is energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortState {
    a: u8,
    b: u8,
}

impl PortState {
    pub const fn all_off() -> Self {
        Self {
            a: ALL_OFF,
            b: ALL_OFF,
        }
    }

    pub const fn get(&self, port: Port) -> u8 {
        match port {
            Port::A => self.a,
            Port::B => self.b,
        }
    }

    pub fn set(&mut self, port: Port, value: u8) {
        match port {
            Port::A => self.a = value,
            Port::B => self.b = value,
        }
    }

    /// Both ports as one 16-bit value, port B in the upper byte.
    pub const fn as_u16(&self) -> u16 {
        ((self.b as u16) << 8) | self.a as u16
    }
}

impl Default for PortState {
    fn default() -> Self {
        Self::all_off()
    }
}
