//! Statically allocated pipeline resources
//!
//! Everything shared between tasks lives here. The reassembler, presenter,
//! USB and touch tasks run on different executors and cores, so all of it
//! is guarded by `CriticalSectionRawMutex`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;

use framelink_core::buffer::ReceivePool;
use framelink_core::pipeline::HandoffQueue;
use framelink_core::touch::TouchSlot;
use framelink_hal_rp2040::MountFlag;

/// Largest frame (header included) a receive buffer holds
///
/// Three of these plus two framebuffers must fit in 264 KiB of RAM.
pub const RECEIVE_CAPACITY: usize = 24 * 1024;

/// Bytes buffered between the USB OUT endpoint and the reassembler
pub const USB_PIPE_SIZE: usize = 4096;

/// Receive buffers cycled by the reassembler and presenter
pub static RECEIVE_POOL: ReceivePool<CriticalSectionRawMutex, RECEIVE_CAPACITY> =
    ReceivePool::new();

/// Completed frames waiting for the presenter
pub static FRAME_QUEUE: HandoffQueue<CriticalSectionRawMutex> = HandoffQueue::new();

/// Raw bulk OUT bytes, filled by the USB pump task
pub static USB_RX_PIPE: Pipe<CriticalSectionRawMutex, USB_PIPE_SIZE> = Pipe::new();

/// Host connection state, kept current by the USB device handler
pub static USB_MOUNT: MountFlag = MountFlag::new();

/// Latest touch point, overwritten by the touch task
pub static TOUCH_SLOT: TouchSlot<CriticalSectionRawMutex> = TouchSlot::new();
