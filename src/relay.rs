use crate::Port;

/// A relay on the board, numbered 1 through 16 as printed on the silkscreen.
///
/// Relays 1-8 sit on port A and 9-16 on port B, relay `n` on bit `(n - 1) % 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelayIndex(u8);

impl RelayIndex {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 16;

    /// Returns `None` for anything outside `1..=16`.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= Self::FIRST && number <= Self::LAST {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Iterate over all sixteen relays.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::FIRST..=Self::LAST).map(Self)
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn port(self) -> Port {
        if self.0 <= 8 {
            Port::A
        } else {
            Port::B
        }
    }

    pub const fn bit(self) -> u8 {
        (self.0 - 1) % 8
    }

    /// AND-mask that clears this relay's bit, switching it on.
    pub const fn on_mask(self) -> u8 {
        !(1u8 << self.bit())
    }

    /// OR-mask that sets this relay's bit, switching it off.
    pub const fn off_mask(self) -> u8 {
        1u8 << self.bit()
    }

    /// Port value with this relay switched to `on`, all other bits taken from `current`.
    pub const fn apply(self, current: u8, on: bool) -> u8 {
        if on {
            current & self.on_mask()
        } else {
            current | self.off_mask()
        }
    }

    /// Whether `port_value` has this relay switched on.
    pub const fn is_on_in(self, port_value: u8) -> bool {
        port_value & self.off_mask() == 0
    }
}
