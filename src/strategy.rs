//! How read responses are fetched from the bridge.
//!
//! After a read request has been issued, the bridge either pushes the response to the host on its
//! own (auto read respond) or keeps it buffered until it is told to send it.  The two ways of
//! collecting the data are the [`Auto`] and [`Manual`] strategies.  Both end in one of two terminal
//! states: the bytes were delivered, or the handshake failed and nothing is returned.  Nothing is
//! retried here.
use crate::bridge::{SmbusBridge, TransferState};
use crate::BusError;
use embedded_hal::delay::DelayNs;
use log::{debug, trace};

pub trait ReadStrategy {
    /// Value the bridge's auto read respond setting must have for this strategy to work.
    fn auto_read_respond(&self) -> bool;

    /// How long a single receive blocks waiting for the bridge to hand over a response.
    fn set_response_timeout(&mut self, timeout_ms: u32);

    /// Collect the response to a read request that was already sent.
    ///
    /// Returns the number of bytes written to `buf`, which is never zero.
    fn receive<B, D>(
        &mut self,
        bridge: &mut B,
        delay: &mut D,
        buf: &mut [u8],
    ) -> Result<usize, BusError<B::Error>>
    where
        B: SmbusBridge,
        D: DelayNs;
}

fn finish<E>(received: Option<usize>) -> Result<usize, BusError<E>> {
    match received {
        None => Err(BusError::ReadTimeout),
        Some(0) => Err(BusError::NoData),
        Some(n) => Ok(n),
    }
}

/// The bridge pushes the response by itself; block on a single receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Auto {
    pub response_timeout_ms: u32,
}

impl Default for Auto {
    fn default() -> Self {
        Self {
            response_timeout_ms: 1000,
        }
    }
}

impl ReadStrategy for Auto {
    fn auto_read_respond(&self) -> bool {
        true
    }

    fn set_response_timeout(&mut self, timeout_ms: u32) {
        self.response_timeout_ms = timeout_ms;
    }

    fn receive<B, D>(
        &mut self,
        bridge: &mut B,
        _delay: &mut D,
        buf: &mut [u8],
    ) -> Result<usize, BusError<B::Error>>
    where
        B: SmbusBridge,
        D: DelayNs,
    {
        let received = bridge
            .read_response(buf, self.response_timeout_ms)
            .map_err(BusError::Transport)?;
        let n = finish(received)?;
        debug!("auto read: received {} byte(s)", n);
        Ok(n)
    }
}

/// Poll the transfer status until the read completes, then force the bridge to hand over the
/// buffered bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manual {
    pub poll_interval_ms: u32,
    pub max_polls: u32,
    pub response_timeout_ms: u32,
}

impl Default for Manual {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            max_polls: 50,
            response_timeout_ms: 1000,
        }
    }
}

impl Manual {
    fn wait_complete<B, D>(&self, bridge: &mut B, delay: &mut D) -> Result<(), BusError<B::Error>>
    where
        B: SmbusBridge,
        D: DelayNs,
    {
        for attempt in 1..=self.max_polls {
            delay.delay_ms(self.poll_interval_ms);
            let status = bridge.transfer_status().map_err(BusError::Transport)?;
            trace!("status poll {}: {:?}", attempt, status);
            match status.state {
                TransferState::Complete => return Ok(()),
                TransferState::Error => return Err(BusError::TransferFailed),
                TransferState::Idle | TransferState::Busy => {}
            }
        }
        Err(BusError::StatusTimeout)
    }
}

impl ReadStrategy for Manual {
    fn auto_read_respond(&self) -> bool {
        false
    }

    fn set_response_timeout(&mut self, timeout_ms: u32) {
        self.response_timeout_ms = timeout_ms;
    }

    fn receive<B, D>(
        &mut self,
        bridge: &mut B,
        delay: &mut D,
        buf: &mut [u8],
    ) -> Result<usize, BusError<B::Error>>
    where
        B: SmbusBridge,
        D: DelayNs,
    {
        let len = u16::try_from(buf.len()).map_err(|_| BusError::Unsupported)?;
        self.wait_complete(bridge, delay)?;

        // Without this the bridge keeps the bytes to itself.
        bridge
            .force_read_response(len)
            .map_err(BusError::Transport)?;
        delay.delay_ms(self.poll_interval_ms);

        let received = bridge
            .read_response(buf, self.response_timeout_ms)
            .map_err(BusError::Transport)?;
        let n = finish(received)?;
        debug!("manual read: received {} byte(s)", n);
        Ok(n)
    }
}

/// Strategy picked at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Auto(Auto),
    Manual(Manual),
}

impl Default for ReadMode {
    fn default() -> Self {
        ReadMode::Manual(Manual::default())
    }
}

impl From<Auto> for ReadMode {
    fn from(a: Auto) -> Self {
        ReadMode::Auto(a)
    }
}

impl From<Manual> for ReadMode {
    fn from(m: Manual) -> Self {
        ReadMode::Manual(m)
    }
}

impl ReadStrategy for ReadMode {
    fn auto_read_respond(&self) -> bool {
        match self {
            ReadMode::Auto(a) => a.auto_read_respond(),
            ReadMode::Manual(m) => m.auto_read_respond(),
        }
    }

    fn set_response_timeout(&mut self, timeout_ms: u32) {
        match self {
            ReadMode::Auto(a) => a.set_response_timeout(timeout_ms),
            ReadMode::Manual(m) => m.set_response_timeout(timeout_ms),
        }
    }

    fn receive<B, D>(
        &mut self,
        bridge: &mut B,
        delay: &mut D,
        buf: &mut [u8],
    ) -> Result<usize, BusError<B::Error>>
    where
        B: SmbusBridge,
        D: DelayNs,
    {
        match self {
            ReadMode::Auto(a) => a.receive(bridge, delay, buf),
            ReadMode::Manual(m) => m.receive(bridge, delay, buf),
        }
    }
}
