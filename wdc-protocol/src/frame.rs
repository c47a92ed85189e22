//! Frames as delimited by the enable line.
//!
//! A frame is every byte received between the enable line's assertion and
//! deassertion:
//! - HEADER (1 byte): see [`crate::header`]
//! - PAYLOAD (0-49 bytes): packet-type specific data
//!
//! There is no start byte, length field or checksum on the wire; the enable
//! line alone marks the boundaries.

use heapless::Vec;

use crate::header::FrameHeader;

/// Maximum complete frame size (HEADER + MAX_PAYLOAD)
pub const MAX_FRAME_SIZE: usize = 50;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - 1;

/// Errors that can occur building or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// No header byte
    Empty,
    /// More than [`MAX_FRAME_SIZE`] bytes
    TooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// One complete bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Raw header byte
    pub header: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given header byte and payload
    pub fn new(header: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::TooLong)?;
        Ok(Self { header, payload })
    }

    /// Build a frame from raw wire bytes, header first
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        match bytes.split_first() {
            Some((&header, payload)) => Self::new(header, payload),
            None => Err(FrameError::Empty),
        }
    }

    /// Decoded view of the header byte
    pub fn decode_header(&self) -> FrameHeader {
        FrameHeader::from_byte(self.header)
    }

    /// Length on the wire, header included
    pub fn len(&self) -> usize {
        1 + self.payload.len()
    }

    /// A frame always carries at least its header byte
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.header;
        buffer[1..frame_len].copy_from_slice(&self.payload);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut vec = Vec::new();
        // Capacity is exactly header + MAX_PAYLOAD_SIZE
        let _ = vec.push(self.header);
        let _ = vec.extend_from_slice(&self.payload);
        vec
    }
}
