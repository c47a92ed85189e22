//! WDC Hardware Abstraction Layer
//!
//! This crate defines the platform services the WDC link stack consumes.
//! A board support crate implements them on top of its chip's registers and
//! pin interrupts, and the same link code runs on any of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  wdc-core (ring buffers, PLL, DLL)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  wdc-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board crate (UART registers, EN pin)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRegisters`] - Serial peripheral register access
//! - [`gpio::EnableLine`] - Out-of-band frame enable line

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{EnableLine, OpenDrainLine};
pub use uart::{UartConfig, UartRegisters};
