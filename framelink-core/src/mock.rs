//! Hand-written collaborators for host tests
//!
//! Each mock is `Clone` and shares its state, so a test can keep a handle
//! while the pipeline owns the other.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use framelink_protocol::FrameHeader;

use crate::traits::{
    DecodeError, DisplayError, FrameDisplay, ImageDecoder, MonotonicTimer, Rgb565,
    TouchController, TouchError, TouchPoint, VendorChannel,
};

/// Build a wire frame around `payload`
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = FrameHeader::for_payload(payload.len()).unwrap().encode().to_vec();
    bytes.extend_from_slice(payload);
    bytes
}

#[derive(Debug, Default)]
struct ChannelState {
    data: VecDeque<u8>,
    mounted: bool,
    max_read: Option<usize>,
    unmount_after: Option<usize>,
    gap: usize,
    gap_left: Cell<usize>,
    consumed: usize,
    reads: Vec<usize>,
}

/// Vendor channel fed from a byte queue
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Rc<RefCell<ChannelState>>,
}

impl MockChannel {
    /// Mounted channel with no data
    pub fn new() -> Self {
        let channel = Self::default();
        channel.set_mounted(true);
        channel
    }

    pub fn push(&self, bytes: &[u8]) {
        self.state.borrow_mut().data.extend(bytes.iter().copied());
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.state.borrow_mut().mounted = mounted;
    }

    /// Cap every read at `n` bytes, as if data trickled in
    pub fn set_max_read(&self, n: usize) {
        self.state.borrow_mut().max_read = Some(n);
    }

    /// Report unmounted once `n` bytes in total have been read
    pub fn unmount_after(&self, n: usize) {
        self.state.borrow_mut().unmount_after = Some(n);
    }

    /// Report nothing available for `polls` checks after every read
    pub fn set_gap(&self, polls: usize) {
        self.state.borrow_mut().gap = polls;
    }

    /// Reconnect with an empty FIFO
    pub fn remount(&self) {
        let mut state = self.state.borrow_mut();
        state.data.clear();
        state.unmount_after = None;
        state.mounted = true;
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().data.len()
    }

    /// Buffer sizes handed to `read`
    pub fn reads(&self) -> Vec<usize> {
        self.state.borrow().reads.clone()
    }
}

impl VendorChannel for MockChannel {
    fn is_mounted(&self) -> bool {
        let state = self.state.borrow();
        match state.unmount_after {
            Some(limit) if state.consumed >= limit => false,
            _ => state.mounted,
        }
    }

    fn available(&self) -> usize {
        let state = self.state.borrow();
        let gap_left = state.gap_left.get();
        if gap_left > 0 {
            state.gap_left.set(gap_left - 1);
            return 0;
        }
        state.data.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut state = self.state.borrow_mut();
        state.reads.push(buf.len());
        let mut n = buf.len().min(state.data.len());
        if let Some(max) = state.max_read {
            n = n.min(max);
        }
        if let Some(limit) = state.unmount_after {
            n = n.min(limit.saturating_sub(state.consumed));
        }
        for slot in buf.iter_mut().take(n) {
            *slot = state.data.pop_front().unwrap();
        }
        state.consumed += n;
        if n > 0 {
            state.gap_left.set(state.gap);
        }
        n
    }
}

/// Delay that returns immediately and records what was asked
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    calls: Rc<Cell<u32>>,
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    pub fn reset(&self) {
        self.calls.set(0);
        self.total_ns.set(0);
    }

    fn record(&self, ns: u64) {
        self.calls.set(self.calls.get() + 1);
        self.total_ns.set(self.total_ns.get() + ns);
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms) * 1_000_000);
    }
}

/// Payload whose first byte makes [`MockDecoder`] fail
pub const UNDECODABLE: u8 = 0xEE;

/// Fills the output with the first payload byte
#[derive(Debug, Clone, Default)]
pub struct MockDecoder {
    decoded: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads seen, in order
    pub fn decoded(&self) -> Vec<Vec<u8>> {
        self.decoded.borrow().clone()
    }
}

impl ImageDecoder for MockDecoder {
    async fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
        self.decoded.borrow_mut().push(input.to_vec());
        match input.first() {
            None => Err(DecodeError::Truncated),
            Some(&UNDECODABLE) => Err(DecodeError::Corrupt),
            Some(&marker) => {
                output.fill(marker);
                Ok(output.len())
            }
        }
    }
}

#[derive(Debug, Default)]
struct DisplayState {
    flushed: Vec<Vec<u8>>,
    cleared: Vec<Rgb565>,
    flip_waits: u32,
    fail_flush: bool,
}

/// Records flushed framebuffers
#[derive(Debug, Clone)]
pub struct MockDisplay {
    len: usize,
    state: Rc<RefCell<DisplayState>>,
}

impl MockDisplay {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            state: Rc::default(),
        }
    }

    pub fn flushed(&self) -> Vec<Vec<u8>> {
        self.state.borrow().flushed.clone()
    }

    pub fn cleared(&self) -> Vec<Rgb565> {
        self.state.borrow().cleared.clone()
    }

    pub fn flip_waits(&self) -> u32 {
        self.state.borrow().flip_waits
    }

    pub fn set_fail_flush(&self, fail: bool) {
        self.state.borrow_mut().fail_flush = fail;
    }
}

impl FrameDisplay for MockDisplay {
    fn framebuffer_len(&self) -> usize {
        self.len
    }

    async fn clear(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.state.borrow_mut().cleared.push(color);
        Ok(())
    }

    async fn flush(&mut self, framebuffer: &[u8]) -> Result<(), DisplayError> {
        let mut state = self.state.borrow_mut();
        if state.fail_flush {
            return Err(DisplayError::Bus);
        }
        state.flushed.push(framebuffer.to_vec());
        Ok(())
    }

    async fn wait_flip_complete(&mut self) {
        self.state.borrow_mut().flip_waits += 1;
    }
}

/// Manually advanced 1 MHz timer
#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    now: Rc<Cell<u64>>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ticks: u64) {
        self.now.set(self.now.get() + ticks);
    }
}

impl MonotonicTimer for MockTimer {
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn ticks_per_second(&self) -> u64 {
        1_000_000
    }
}

/// Touch controller replaying scripted reads
#[derive(Debug, Default)]
pub struct MockTouch {
    reads: VecDeque<Result<Option<TouchPoint>, TouchError>>,
    fail_interrupt: bool,
}

impl MockTouch {
    pub fn new(reads: &[Result<Option<TouchPoint>, TouchError>]) -> Self {
        Self {
            reads: reads.iter().copied().collect(),
            fail_interrupt: false,
        }
    }

    pub fn fail_next_interrupt(&mut self) {
        self.fail_interrupt = true;
    }
}

impl TouchController for MockTouch {
    async fn wait_interrupt(&mut self) -> Result<(), TouchError> {
        if core::mem::take(&mut self.fail_interrupt) {
            return Err(TouchError::Interrupt);
        }
        Ok(())
    }

    async fn read_point(&mut self) -> Result<Option<TouchPoint>, TouchError> {
        self.reads.pop_front().unwrap_or(Ok(None))
    }
}
