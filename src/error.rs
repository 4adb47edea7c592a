use core::fmt;

/// Errors produced while talking to the relay board through the bridge.
///
/// `E` is the error type of the underlying [`SmbusBridge`](crate::SmbusBridge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<E> {
    /// The bridge rejected a write request.
    WriteFailed(E),
    /// Any other bridge request failed (open, configure, read request, status poll, ...).
    Transport(E),
    /// No read response arrived before the receive timeout.
    ReadTimeout,
    /// Manual-mode polling ran out of attempts before the transfer completed.
    StatusTimeout,
    /// The bridge answered but delivered fewer bytes than requested.
    NoData,
    /// The bridge reported the transfer as failed (e.g. the target did not ACK).
    TransferFailed,
    /// Relay numbers are 1-based and only go up to 16.
    InvalidRelay(u8),
    /// The mux only has channels 0 through 7.
    InvalidChannel(u8),
    /// A read-back returned something other than what was written.
    ValueMismatch { expected: u8, actual: u8 },
    /// The bridge cannot express this sequence of I2C operations.
    Unsupported,
    /// The session was already closed.
    Closed,
}

impl<E: fmt::Debug> fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::WriteFailed(e) => write!(f, "write request failed: {:?}", e),
            BusError::Transport(e) => write!(f, "bridge request failed: {:?}", e),
            BusError::ReadTimeout => f.write_str("timed out waiting for read response"),
            BusError::StatusTimeout => f.write_str("transfer did not complete while polling status"),
            BusError::NoData => f.write_str("bridge returned no data"),
            BusError::TransferFailed => f.write_str("bridge reported a failed transfer"),
            BusError::InvalidRelay(index) => write!(f, "invalid relay number {}", index),
            BusError::InvalidChannel(channel) => write!(f, "invalid mux channel {}", channel),
            BusError::ValueMismatch { expected, actual } => write!(
                f,
                "read back 0x{:02X}, expected 0x{:02X}",
                actual, expected
            ),
            BusError::Unsupported => f.write_str("unsupported I2C operation sequence"),
            BusError::Closed => f.write_str("session is closed"),
        }
    }
}

impl<E: fmt::Debug> embedded_hal::i2c::Error for BusError<E> {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match self {
            BusError::TransferFailed => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for BusError<E> {}
