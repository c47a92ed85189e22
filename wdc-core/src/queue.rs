//! Bounded FIFO of complete frames

use heapless::Deque;
use wdc_protocol::Frame;

use crate::error::Error;

/// Fixed-depth frame queue
///
/// A push onto a full queue is rejected and leaves the contents unchanged.
pub struct FrameQueue<const DEPTH: usize> {
    frames: Deque<Frame, DEPTH>,
}

impl<const DEPTH: usize> Default for FrameQueue<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> FrameQueue<DEPTH> {
    pub const fn new() -> Self {
        Self {
            frames: Deque::new(),
        }
    }

    /// Append a frame at the back
    pub fn push(&mut self, frame: Frame) -> Result<(), Error> {
        self.frames.push_back(frame).map_err(|_| Error::QueueFull)
    }

    /// Remove the oldest frame
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Oldest frame, left in place
    pub fn peek(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.is_full()
    }

    pub const fn capacity(&self) -> usize {
        DEPTH
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
