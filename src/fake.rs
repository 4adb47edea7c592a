//! Scripted stand-in for the HID bridge, with a TCA9548A at 0x70 and an MCP23017 at 0x20
//! behind it.
use crate::bridge::{BridgeConfig, SmbusBridge, TransferState, TransferStatus};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub(crate) const MUX: u8 = 0x70;
pub(crate) const EXPANDER: u8 = 0x20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Open(u32),
    SetTimeouts(u32),
    Configure(BridgeConfig),
    Write { address: u8, data: Vec<u8> },
    ReadRequest { address: u8, len: u16 },
    AddressReadRequest { address: u8, len: u16, target: Vec<u8> },
    TransferStatus,
    ForceReadResponse(u16),
    ReadResponse { timeout_ms: u32 },
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FakeError;

struct Device {
    regs: [u8; 0x16],
    single_register: bool,
}

enum Pending {
    Data(Vec<u8>),
    Nack,
}

struct State {
    open: bool,
    closed: bool,
    auto_read: bool,
    devices: BTreeMap<u8, Device>,
    events: Vec<Event>,
    pending: Option<Pending>,
    polls: usize,
    polls_until_complete: usize,
    forced: bool,
    empty_responses: bool,
    fail_open: bool,
    fail_all_writes: bool,
    failing_writes: Vec<Vec<u8>>,
}

#[derive(Clone)]
pub(crate) struct FakeBridge(Rc<RefCell<State>>);

impl FakeBridge {
    pub fn new() -> Self {
        let mut devices = BTreeMap::new();
        devices.insert(
            MUX,
            Device {
                regs: [0; 0x16],
                single_register: true,
            },
        );
        let mut regs = [0; 0x16];
        regs[0x00] = 0xff;
        regs[0x01] = 0xff;
        devices.insert(
            EXPANDER,
            Device {
                regs,
                single_register: false,
            },
        );
        Self(Rc::new(RefCell::new(State {
            open: false,
            closed: false,
            auto_read: false,
            devices,
            events: Vec::new(),
            pending: None,
            polls: 0,
            polls_until_complete: 0,
            forced: false,
            empty_responses: false,
            fail_open: false,
            fail_all_writes: false,
            failing_writes: Vec::new(),
        })))
    }

    pub fn set_auto_read(&self, auto_read: bool) {
        self.0.borrow_mut().auto_read = auto_read;
    }

    pub fn set_register(&self, address: u8, reg: u8, value: u8) {
        let mut s = self.0.borrow_mut();
        let dev = s.devices.get_mut(&address).expect("no such device");
        dev.regs[reg as usize] = value;
    }

    pub fn register(&self, address: u8, reg: u8) -> u8 {
        self.0.borrow().devices[&address].regs[reg as usize]
    }

    pub fn remove_device(&self, address: u8) {
        self.0.borrow_mut().devices.remove(&address);
    }

    /// Number of `Busy` answers before a pending read reports `Complete`.
    pub fn set_polls_until_complete(&self, polls: usize) {
        self.0.borrow_mut().polls_until_complete = polls;
    }

    pub fn set_empty_responses(&self, empty: bool) {
        self.0.borrow_mut().empty_responses = empty;
    }

    pub fn fail_open(&self) {
        self.0.borrow_mut().fail_open = true;
    }

    pub fn fail_all_writes(&self, fail: bool) {
        self.0.borrow_mut().fail_all_writes = fail;
    }

    /// Reject every write request carrying exactly `data`.
    pub fn fail_writes_of(&self, data: &[u8]) {
        self.0.borrow_mut().failing_writes.push(data.to_vec());
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().events.iter().filter(|e| f(e)).count()
    }

    /// All attempted writes as `(8-bit address, data)`.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.0
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Write { address, data } => Some((*address, data.clone())),
                _ => None,
            })
            .collect()
    }

    fn start_read(&self, address: u8, len: u16, reg: u8) {
        let mut s = self.0.borrow_mut();
        let pending = match s.devices.get(&(address >> 1)) {
            Some(dev) => {
                let start = if dev.single_register { 0 } else { reg as usize };
                Pending::Data(
                    (0..len as usize)
                        .map(|i| dev.regs[(start + i) % dev.regs.len()])
                        .collect(),
                )
            }
            None => Pending::Nack,
        };
        s.pending = Some(pending);
        s.polls = 0;
        s.forced = false;
    }
}

impl SmbusBridge for FakeBridge {
    type Error = FakeError;

    fn open(&mut self, device_index: u32) -> Result<(), FakeError> {
        let mut s = self.0.borrow_mut();
        s.events.push(Event::Open(device_index));
        if s.fail_open {
            return Err(FakeError);
        }
        s.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.0.borrow().open
    }

    fn set_timeouts(&mut self, response_timeout_ms: u32) -> Result<(), FakeError> {
        self.0
            .borrow_mut()
            .events
            .push(Event::SetTimeouts(response_timeout_ms));
        Ok(())
    }

    fn configure(&mut self, config: &BridgeConfig) -> Result<(), FakeError> {
        let mut s = self.0.borrow_mut();
        s.events.push(Event::Configure(*config));
        s.auto_read = config.auto_read_respond;
        Ok(())
    }

    fn write_request(&mut self, address: u8, data: &[u8]) -> Result<(), FakeError> {
        let mut guard = self.0.borrow_mut();
        let s = &mut *guard;
        s.events.push(Event::Write {
            address,
            data: data.to_vec(),
        });
        if s.closed || s.fail_all_writes || s.failing_writes.iter().any(|w| w == data) {
            return Err(FakeError);
        }
        let dev = s.devices.get_mut(&(address >> 1)).ok_or(FakeError)?;
        match data {
            [value] if dev.single_register => dev.regs[0] = *value,
            [reg, value] if !dev.single_register => dev.regs[*reg as usize] = *value,
            _ => return Err(FakeError),
        }
        Ok(())
    }

    fn read_request(&mut self, address: u8, len: u16) -> Result<(), FakeError> {
        self.0
            .borrow_mut()
            .events
            .push(Event::ReadRequest { address, len });
        self.start_read(address, len, 0);
        Ok(())
    }

    fn address_read_request(
        &mut self,
        address: u8,
        len: u16,
        target: &[u8],
    ) -> Result<(), FakeError> {
        self.0.borrow_mut().events.push(Event::AddressReadRequest {
            address,
            len,
            target: target.to_vec(),
        });
        self.start_read(address, len, target.first().copied().unwrap_or(0));
        Ok(())
    }

    fn transfer_status(&mut self) -> Result<TransferStatus, FakeError> {
        let mut guard = self.0.borrow_mut();
        let s = &mut *guard;
        s.events.push(Event::TransferStatus);
        let status = match &s.pending {
            None => TransferStatus {
                state: TransferState::Idle,
                bytes_read: 0,
            },
            Some(Pending::Nack) => TransferStatus {
                state: TransferState::Error,
                bytes_read: 0,
            },
            Some(Pending::Data(data)) => {
                let len = data.len() as u16;
                if s.polls < s.polls_until_complete {
                    s.polls += 1;
                    TransferStatus {
                        state: TransferState::Busy,
                        bytes_read: 0,
                    }
                } else {
                    TransferStatus {
                        state: TransferState::Complete,
                        bytes_read: len,
                    }
                }
            }
        };
        Ok(status)
    }

    fn force_read_response(&mut self, len: u16) -> Result<(), FakeError> {
        let mut s = self.0.borrow_mut();
        s.events.push(Event::ForceReadResponse(len));
        s.forced = true;
        Ok(())
    }

    fn read_response(
        &mut self,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<Option<usize>, FakeError> {
        let mut guard = self.0.borrow_mut();
        let s = &mut *guard;
        s.events.push(Event::ReadResponse { timeout_ms });
        let deliver = s.auto_read || s.forced;
        match s.pending.take() {
            Some(Pending::Data(data)) if deliver => {
                if s.empty_responses {
                    return Ok(Some(0));
                }
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(Some(n))
            }
            Some(Pending::Nack) if deliver => Ok(Some(0)),
            other => {
                s.pending = other;
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<(), FakeError> {
        let mut s = self.0.borrow_mut();
        s.events.push(Event::Close);
        s.open = false;
        s.closed = true;
        Ok(())
    }
}

/// Delay that records every `delay_ms` call instead of sleeping.
#[derive(Clone, Default)]
pub(crate) struct RecordingDelay(Rc<RefCell<Vec<u32>>>);

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<u32> {
        self.0.borrow().clone()
    }

    pub fn total_ms(&self) -> u32 {
        self.0.borrow().iter().sum()
    }
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(ms);
    }
}
