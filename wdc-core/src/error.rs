//! Link error taxonomy
//!
//! Only application-context calls return these. Interrupt handlers record
//! failures in [`crate::uart::UartStats`] and [`crate::physical::LinkStats`]
//! instead.

use core::fmt;

use wdc_protocol::FrameError;

/// Errors reported by the link stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Not enough free space in a ring buffer for an all-or-nothing write
    BufferOverflow,
    /// Frame is empty or longer than the maximum frame size
    InvalidFrameLength,
    /// Frame queue is at capacity
    QueueFull,
    /// Requested baud rate is zero, above the ceiling, or out of divisor range
    UnsupportedBaudRate,
    /// No inbound frame is queued
    NoFrameAvailable,
    /// Caller's buffer cannot hold the frame
    BufferTooSmall,
    /// Hardware flag did not clear within the spin limit
    Timeout,
    /// Frame travels in the direction this side does not consume
    UnexpectedDirection,
    /// Payload length does not match the packet type
    InvalidPayloadLength,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::BufferOverflow => "ring buffer overflow",
            Error::InvalidFrameLength => "invalid frame length",
            Error::QueueFull => "frame queue full",
            Error::UnsupportedBaudRate => "unsupported baud rate",
            Error::NoFrameAvailable => "no frame available",
            Error::BufferTooSmall => "buffer too small",
            Error::Timeout => "timed out",
            Error::UnexpectedDirection => "unexpected packet direction",
            Error::InvalidPayloadLength => "invalid payload length for packet type",
        };
        f.write_str(msg)
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Empty | FrameError::TooLong => Error::InvalidFrameLength,
            FrameError::BufferTooSmall => Error::BufferTooSmall,
        }
    }
}
