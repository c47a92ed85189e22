//! Fixed-capacity byte ring buffer
//!
//! `head` is the next slot to read, `tail` the next slot to write. One slot
//! is always left unused so that `head == tail` unambiguously means empty;
//! a buffer of `N` slots holds at most `N - 1` bytes. Both the receive and
//! transmit sides of the UART driver use this type.

/// Circular byte queue with independent read and write cursors
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const VALID: () = assert!(N >= 2, "ring buffer needs at least two slots");

    /// Create an empty ring buffer
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
        }
    }

    /// Number of bytes the buffer can hold
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Number of bytes waiting to be read
    pub fn available(&self) -> usize {
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            N - self.head + self.tail
        }
    }

    /// Number of bytes that can be written before the buffer is full
    pub fn free(&self) -> usize {
        self.capacity() - self.available()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        Self::advance(self.tail) == self.head
    }

    /// Append one byte
    ///
    /// Returns `false` (and drops the byte) if the buffer is full.
    pub fn push(&mut self, byte: u8) -> bool {
        let next = Self::advance(self.tail);
        if next == self.head {
            return false;
        }
        self.buf[self.tail] = byte;
        self.tail = next;
        true
    }

    /// Remove the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.head];
        self.head = Self::advance(self.head);
        Some(byte)
    }

    /// Look at the oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[self.head])
        }
    }

    /// Append as many bytes of `data` as fit
    ///
    /// Never blocks. Bytes beyond the free space are dropped; compare the
    /// returned count with `data.len()` to detect backpressure.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.free());
        if count == 0 {
            return 0;
        }

        // Up to the end of the array, then the remainder from index 0
        let first = count.min(N - self.tail);
        self.buf[self.tail..self.tail + first].copy_from_slice(&data[..first]);
        let rest = count - first;
        self.buf[..rest].copy_from_slice(&data[first..count]);

        self.tail = (self.tail + count) % N;
        count
    }

    /// Move up to `out.len()` bytes into `out`
    ///
    /// Returns the number of bytes copied.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.available());
        if count == 0 {
            return 0;
        }

        let first = count.min(N - self.head);
        out[..first].copy_from_slice(&self.buf[self.head..self.head + first]);
        let rest = count - first;
        out[first..count].copy_from_slice(&self.buf[..rest]);

        self.head = (self.head + count) % N;
        count
    }

    /// Discard all contents and reset both cursors to zero
    ///
    /// Touches both cursors; the owner must make sure no interrupt handler
    /// uses the buffer concurrently.
    pub fn flush(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    const fn advance(index: usize) -> usize {
        let next = index + 1;
        if next == N {
            0
        } else {
            next
        }
    }
}
