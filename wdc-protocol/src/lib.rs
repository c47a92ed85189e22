//! Wearable Device Companion serial protocol
//!
//! This crate defines the frame and header layout shared by the companion
//! (sensor node) and the base (host) on the WDC UART link.
//!
//! # Protocol Overview
//!
//! The link is a half-duplex 8-N-1 UART. A separate enable line marks the
//! start (assertion) and end (deassertion) of each frame, so frames carry no
//! delimiter or length on the wire:
//! ```text
//! ┌────────┬─────────────┐
//! │ HEADER │ PAYLOAD     │
//! │ 1B     │ 0–49B       │
//! └────────┴─────────────┘
//! ```
//!
//! Enumeration and request frames are always 4 bytes; data and event frames
//! may use up to [`MAX_FRAME_SIZE`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod header;

pub use frame::{Frame, FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use header::{Direction, Endpoint, FrameHeader, PacketType};

/// Frame length of an enumeration packet (header + 3 payload bytes)
pub const ENUMERATION_FRAME_LEN: usize = 4;
/// Frame length of a request packet (header + 3 payload bytes)
pub const REQUEST_FRAME_LEN: usize = 4;
/// Maximum frame length of a data packet
pub const DATA_FRAME_LEN: usize = MAX_FRAME_SIZE;
/// Maximum frame length of an event packet
pub const EVENT_FRAME_LEN: usize = MAX_FRAME_SIZE;

/// Baud rate used before any other rate is negotiated
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Highest baud rate the protocol allows
pub const MAX_BAUD_RATE: u32 = 500_000;
