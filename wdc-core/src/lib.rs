//! Companion-side link stack for the WDC serial bus
//!
//! This crate contains everything between the UART peripheral and the
//! application's packet handlers:
//!
//! - Byte ring buffers shared between interrupt and application context
//! - Interrupt-driven UART driver
//! - Physical link layer (enable-line framing, frame queues)
//! - Data link layer (header decode and dispatch, packet builders)
//! - Link configuration and error types
//!
//! ```text
//!  RX irq ──▶ UartDriver ──▶ RingBuffer ──▶ PhysicalLink ──▶ FrameQueue ──▶ DataLink ──▶ PacketHandler
//!  TX irq ◀── UartDriver ◀── RingBuffer ◀── PhysicalLink ◀── FrameQueue ◀── DataLink ◀── application
//!                                               ▲
//!                                    enable line edge irq
//! ```
//!
//! The board crate owns the interrupt vectors and forwards them to
//! [`UartDriver::on_rx_interrupt`], [`UartDriver::on_tx_empty_interrupt`],
//! [`PhysicalLink::on_enable_edge`] and [`PhysicalLink::on_transmit_complete`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod datalink;
pub mod error;
pub mod physical;
pub mod queue;
pub mod ring_buffer;
pub mod traits;
pub mod uart;

#[cfg(test)]
mod mock;

pub use config::{EnablePolarity, LinkConfig};
pub use datalink::{DataLink, DataLinkStats, Packet, PacketHandler};
pub use error::Error;
pub use physical::{BusState, LinkStats, PhysicalLink, DEFAULT_QUEUE_DEPTH};
pub use queue::FrameQueue;
pub use ring_buffer::RingBuffer;
pub use traits::{ByteCallback, FrameCallback, FrameSink, FrameSource};
pub use uart::{UartDriver, UartStats, DEFAULT_RX_BUFFER_SIZE, DEFAULT_TX_BUFFER_SIZE};
