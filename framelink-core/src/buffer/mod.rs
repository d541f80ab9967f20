//! Statically sized buffers shared between pipeline stages
//!
//! - [`ReceivePool`]: three receive buffers cycling through
//!   `Empty -> Filling -> Ready -> Decoding -> Empty`
//! - [`FrameCursor`]: bounds-checked write position inside one buffer
//! - [`DoubleBuffer`]: front/back display framebuffers

pub mod cursor;
pub mod framebuffer;
pub mod pool;

pub use cursor::{CursorError, FrameCursor};
pub use framebuffer::DoubleBuffer;
pub use pool::{
    DecodeGuard, FillGuard, FrameView, PoolError, ReceivePool, SlotState, HANDOFF_CAPACITY,
    RECEIVE_BUFFER_COUNT,
};
