//! Registration seams between the layers
//!
//! Callbacks run synchronously in interrupt context and must return quickly.
//! Plain closures implement them through blanket impls.

use wdc_protocol::Frame;

use crate::error::Error;

/// Invoked for every byte the UART receives
pub trait ByteCallback {
    fn byte_received(&self, byte: u8);
}

impl<F: Fn(u8)> ByteCallback for F {
    fn byte_received(&self, byte: u8) {
        self(byte)
    }
}

/// Invoked on a frame boundary (start of frame, or a valid end of frame)
pub trait FrameCallback {
    fn notify(&self);
}

impl<F: Fn()> FrameCallback for F {
    fn notify(&self) {
        self()
    }
}

/// Supplier of completed inbound frames
pub trait FrameSource {
    /// Take the oldest completed frame, if any
    fn next_frame(&self) -> Option<Frame>;
}

/// Consumer of outbound frames
pub trait FrameSink {
    /// Queue a frame for transmission
    fn submit(&self, frame: Frame) -> Result<(), Error>;
}
