//! Mock hardware adapters for integration tests.
//!
//! Every mock records what it was asked to do so tests can assert on the
//! full transaction history without touching a real bus or flash.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::rc::Rc;

use cctlamp::app::events::LampEvent;
use cctlamp::app::ports::{BusPort, EventSink, KeyValueStore, ProtocolBridge, PwmPort};
use cctlamp::error::{BusError, Error, Result, StoreError};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

// ── Bus ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Write { addr: u8, reg: u8, bytes: Vec<u8> },
    WriteRead { addr: u8, reg: u8, len: usize },
    Read { addr: u8, len: usize },
    Probe(u8),
}

#[derive(Default)]
pub struct BusLog {
    pub ops: Vec<BusOp>,
    /// Answers for `read` / `write_then_read`, consumed in order. An empty
    /// queue answers with zeros.
    pub replies: VecDeque<Vec<u8>>,
    /// Addresses that NACK every transaction.
    pub absent: Vec<u8>,
    /// Fail the transaction with this zero-based index.
    pub fail_at: Option<usize>,
}

/// Cloneable handle: the code under test owns one, the test keeps another.
#[derive(Clone, Default)]
pub struct MockBus(pub Rc<RefCell<BusLog>>);

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, bytes: &[u8]) -> &Self {
        self.0.borrow_mut().replies.push_back(bytes.to_vec());
        self
    }

    pub fn absent(&self, addr: u8) -> &Self {
        self.0.borrow_mut().absent.push(addr);
        self
    }

    pub fn fail_at(&self, index: usize) {
        self.0.borrow_mut().fail_at = Some(index);
    }

    pub fn ops(&self) -> Vec<BusOp> {
        self.0.borrow().ops.clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().ops.clear();
    }

    /// Register writes `(reg, value)` sent to `addr`.
    pub fn register_writes(&self, addr: u8) -> Vec<(u8, u8)> {
        self.0
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Write { addr: a, reg, bytes } if *a == addr && bytes.len() == 1 => {
                    Some((*reg, bytes[0]))
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, addr: u8, op: BusOp) -> core::result::Result<(), BusError> {
        let mut log = self.0.borrow_mut();
        let index = log.ops.len();
        log.ops.push(op);
        if log.fail_at == Some(index) {
            return Err(BusError::Timeout);
        }
        if log.absent.contains(&addr) {
            return Err(BusError::Nack);
        }
        Ok(())
    }

    fn fill(&self, out: &mut [u8]) {
        let reply = self.0.borrow_mut().replies.pop_front().unwrap_or_default();
        for (dst, src) in out.iter_mut().zip(reply.iter().chain(std::iter::repeat(&0))) {
            *dst = *src;
        }
    }
}

impl BusPort for MockBus {
    fn write(&mut self, addr: u8, reg: u8, bytes: &[u8]) -> core::result::Result<(), BusError> {
        self.record(
            addr,
            BusOp::Write {
                addr,
                reg,
                bytes: bytes.to_vec(),
            },
        )
    }

    fn write_then_read(
        &mut self,
        addr: u8,
        reg: u8,
        out: &mut [u8],
    ) -> core::result::Result<(), BusError> {
        self.record(
            addr,
            BusOp::WriteRead {
                addr,
                reg,
                len: out.len(),
            },
        )?;
        self.fill(out);
        Ok(())
    }

    fn read(&mut self, addr: u8, out: &mut [u8]) -> core::result::Result<(), BusError> {
        self.record(
            addr,
            BusOp::Read {
                addr,
                len: out.len(),
            },
        )?;
        self.fill(out);
        Ok(())
    }

    fn probe(&mut self, addr: u8) -> bool {
        self.record(addr, BusOp::Probe(addr)).is_ok()
    }
}

// ── PWM ───────────────────────────────────────────────────────

pub struct MockPwm {
    pub duties: [u8; 8],
    pub writes: Vec<(u8, u8)>,
    /// Channels whose writes fail with a bus error.
    pub failing: Vec<u8>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self {
            duties: [0; 8],
            writes: Vec::new(),
            failing: Vec::new(),
        }
    }

    pub fn count_writes_of(&self, duty: u8) -> usize {
        self.writes.iter().filter(|(_, d)| *d == duty).count()
    }
}

impl Default for MockPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmPort for MockPwm {
    fn set_channel(&mut self, channel: u8, duty: u8) -> Result<()> {
        if channel >= 8 {
            return Err(Error::InvalidArgument("PWM channel out of range"));
        }
        self.writes.push((channel, duty));
        if self.failing.contains(&channel) {
            return Err(Error::Bus(BusError::Nack));
        }
        self.duties[channel as usize] = duty;
        Ok(())
    }
}

// ── Delay / GPIO ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

#[derive(Default)]
pub struct MockPin {
    pub high: bool,
    pub transitions: Vec<bool>,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.high = false;
        self.transitions.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.high = true;
        self.transitions.push(true);
        Ok(())
    }
}

// ── Key-value store ───────────────────────────────────────────

#[derive(Default)]
pub struct MockStore {
    pub staged: HashMap<String, i32>,
    pub committed: HashMap<String, i32>,
    pub commits: usize,
    pub fail_get: bool,
    pub fail_set: bool,
    pub fail_commit: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: i32) -> Self {
        let mut store = Self::default();
        store.staged.insert(key.to_owned(), value);
        store.committed.insert(key.to_owned(), value);
        store
    }

    /// What a fresh boot would read back.
    pub fn reboot(&self) -> Self {
        Self {
            staged: self.committed.clone(),
            committed: self.committed.clone(),
            ..Self::default()
        }
    }
}

impl KeyValueStore for MockStore {
    fn get_i32(&self, key: &str) -> core::result::Result<Option<i32>, StoreError> {
        if self.fail_get {
            return Err(StoreError::Io);
        }
        Ok(self.staged.get(key).copied())
    }

    fn set_i32(&mut self, key: &str, value: i32) -> core::result::Result<(), StoreError> {
        if self.fail_set {
            return Err(StoreError::Full);
        }
        self.staged.insert(key.to_owned(), value);
        Ok(())
    }

    fn commit(&mut self) -> core::result::Result<(), StoreError> {
        if self.fail_commit {
            return Err(StoreError::Io);
        }
        self.committed.clone_from(&self.staged);
        self.commits += 1;
        Ok(())
    }
}

// ── Event sink / protocol bridge ──────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<LampEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&LampEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LampEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Default)]
pub struct MockBridge {
    pub joined: Cell<bool>,
    pub reports: RefCell<Vec<f32>>,
}

impl MockBridge {
    pub fn joined() -> Self {
        let bridge = Self::default();
        bridge.joined.set(true);
        bridge
    }
}

impl ProtocolBridge for MockBridge {
    fn is_joined(&self) -> bool {
        self.joined.get()
    }

    fn report_temperature(&self, celsius: f32) {
        self.reports.borrow_mut().push(celsius);
    }
}
