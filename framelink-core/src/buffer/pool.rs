//! Receive buffer pool
//!
//! The reassembler fills one buffer while the presenter decodes from
//! another. Every buffer carries an explicit ownership state and the pool
//! refuses any transition outside the cycle
//!
//! ```text
//! Empty -> Filling -> Ready -> Decoding -> Empty
//!             |          |
//!             +-> Empty  +-> Empty   (abort / dropped frame)
//! ```
//!
//! Access to the bytes goes through RAII guards, so a buffer returns to
//! `Empty` even if the owning future is dropped halfway through a frame.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use portable_atomic::{AtomicU8, Ordering};

/// Frames that may wait in the handoff queue
pub const HANDOFF_CAPACITY: usize = 1;

/// One buffer being filled, one queued, one being decoded
pub const RECEIVE_BUFFER_COUNT: usize = HANDOFF_CAPACITY + 2;

/// Ownership state of one receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SlotState {
    /// Free for the reassembler
    Empty = 0,
    /// Reassembler is writing a frame
    Filling = 1,
    /// Holds a complete frame, referenced by a queued [`FrameView`]
    Ready = 2,
    /// Presenter is decoding the frame
    Decoding = 3,
}

impl SlotState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SlotState::Filling,
            2 => SlotState::Ready,
            3 => SlotState::Decoding,
            _ => SlotState::Empty,
        }
    }
}

/// Errors from pool transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// Slot index outside the pool
    InvalidSlot { slot: usize },
    /// Slot was not in the state the transition starts from
    WrongState {
        slot: usize,
        expected: SlotState,
        actual: SlotState,
    },
    /// Buffer memory is still borrowed by another guard
    Locked { slot: usize },
    /// View does not lie inside the buffer
    ViewOutOfBounds { slot: usize },
}

/// Location of one frame payload inside the pool
///
/// Passed through the handoff queue in place of the bytes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameView {
    /// Receive buffer index
    pub slot: usize,
    /// Payload start (just past the length header)
    pub offset: usize,
    /// Payload length
    pub len: usize,
    /// Order in which the frame header was parsed
    pub sequence: u32,
}

impl FrameView {
    /// One past the last payload byte
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

struct ReceiveBuffer<M: RawMutex, const CAP: usize> {
    state: AtomicU8,
    data: Mutex<M, [u8; CAP]>,
}

impl<M: RawMutex, const CAP: usize> ReceiveBuffer<M, CAP> {
    const fn new() -> Self {
        Self {
            state: AtomicU8::new(SlotState::Empty as u8),
            data: Mutex::new([0; CAP]),
        }
    }
}

/// Fixed set of receive buffers of `CAP` bytes each
pub struct ReceivePool<M: RawMutex, const CAP: usize> {
    buffers: [ReceiveBuffer<M, CAP>; RECEIVE_BUFFER_COUNT],
}

impl<M: RawMutex, const CAP: usize> Default for ReceivePool<M, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const CAP: usize> ReceivePool<M, CAP> {
    pub const fn new() -> Self {
        Self {
            buffers: [
                ReceiveBuffer::new(),
                ReceiveBuffer::new(),
                ReceiveBuffer::new(),
            ],
        }
    }

    /// Capacity of each buffer in bytes
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Current state of a slot
    pub fn state(&self, slot: usize) -> Result<SlotState, PoolError> {
        let buffer = self.buffers.get(slot).ok_or(PoolError::InvalidSlot { slot })?;
        Ok(SlotState::from_raw(buffer.state.load(Ordering::Acquire)))
    }

    /// Take an empty buffer for writing (`Empty -> Filling`)
    pub fn fill(&self, slot: usize) -> Result<FillGuard<'_, M, CAP>, PoolError> {
        let (buffer, data) = self.acquire(slot, SlotState::Empty, SlotState::Filling)?;
        Ok(FillGuard {
            state: &buffer.state,
            data: Some(data),
            slot,
        })
    }

    /// Return a complete frame that was never queued (`Ready -> Empty`)
    pub fn release(&self, slot: usize) -> Result<(), PoolError> {
        let buffer = self.buffers.get(slot).ok_or(PoolError::InvalidSlot { slot })?;
        Self::transition(buffer, slot, SlotState::Ready, SlotState::Empty)
    }

    /// Take a queued frame for decoding (`Ready -> Decoding`)
    pub fn claim(&self, view: FrameView) -> Result<DecodeGuard<'_, M, CAP>, PoolError> {
        if view.end() > CAP {
            return Err(PoolError::ViewOutOfBounds { slot: view.slot });
        }
        let (buffer, data) = self.acquire(view.slot, SlotState::Ready, SlotState::Decoding)?;
        Ok(DecodeGuard {
            state: &buffer.state,
            data: Some(data),
            view,
        })
    }

    fn acquire(
        &self,
        slot: usize,
        from: SlotState,
        to: SlotState,
    ) -> Result<(&ReceiveBuffer<M, CAP>, MutexGuard<'_, M, [u8; CAP]>), PoolError> {
        let buffer = self.buffers.get(slot).ok_or(PoolError::InvalidSlot { slot })?;
        Self::transition(buffer, slot, from, to)?;
        match buffer.data.try_lock() {
            Ok(data) => Ok((buffer, data)),
            Err(_) => {
                buffer.state.store(from as u8, Ordering::Release);
                Err(PoolError::Locked { slot })
            }
        }
    }

    fn transition(
        buffer: &ReceiveBuffer<M, CAP>,
        slot: usize,
        from: SlotState,
        to: SlotState,
    ) -> Result<(), PoolError> {
        buffer
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| PoolError::WrongState {
                slot,
                expected: from,
                actual: SlotState::from_raw(actual),
            })
    }
}

/// Write access to a buffer in `Filling`
///
/// [`commit`](Self::commit) marks the frame complete. Dropping the guard
/// without committing discards the partial frame.
pub struct FillGuard<'a, M: RawMutex, const CAP: usize> {
    state: &'a AtomicU8,
    data: Option<MutexGuard<'a, M, [u8; CAP]>>,
    slot: usize,
}

impl<M: RawMutex, const CAP: usize> FillGuard<'_, M, CAP> {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        match self.data.as_mut() {
            Some(data) => &mut data[..],
            None => &mut [],
        }
    }

    /// Hand the buffer over as a complete frame (`Filling -> Ready`)
    pub fn commit(mut self) {
        // Unlock before publishing so the claimer never sees a held lock
        drop(self.data.take());
        self.state.store(SlotState::Ready as u8, Ordering::Release);
    }
}

impl<M: RawMutex, const CAP: usize> Drop for FillGuard<'_, M, CAP> {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            drop(data);
            self.state.store(SlotState::Empty as u8, Ordering::Release);
        }
    }
}

/// Read access to a frame in `Decoding`; dropping it frees the buffer
pub struct DecodeGuard<'a, M: RawMutex, const CAP: usize> {
    state: &'a AtomicU8,
    data: Option<MutexGuard<'a, M, [u8; CAP]>>,
    view: FrameView,
}

impl<M: RawMutex, const CAP: usize> DecodeGuard<'_, M, CAP> {
    pub fn view(&self) -> FrameView {
        self.view
    }

    /// Compressed payload bytes
    pub fn payload(&self) -> &[u8] {
        match self.data.as_ref() {
            Some(data) => &data[self.view.offset..self.view.end()],
            None => &[],
        }
    }
}

impl<M: RawMutex, const CAP: usize> Drop for DecodeGuard<'_, M, CAP> {
    fn drop(&mut self) {
        drop(self.data.take());
        self.state.store(SlotState::Empty as u8, Ordering::Release);
    }
}
