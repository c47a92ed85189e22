//! Interrupt-driven UART driver
//!
//! Owns the serial peripheral plus one receive and one transmit
//! [`RingBuffer`]. The board crate forwards the "receive complete" and
//! "transmit data register empty" interrupts to [`UartDriver::on_rx_interrupt`]
//! and [`UartDriver::on_tx_empty_interrupt`]; application code uses the
//! non-blocking byte API.
//!
//! Every access to the peripheral and buffers happens inside a short
//! critical section, so a flush that resets both cursors can never be torn
//! by an interrupt handler.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use wdc_hal::{UartConfig, UartRegisters};

use crate::error::Error;
use crate::ring_buffer::RingBuffer;
use crate::traits::ByteCallback;

/// Receive ring buffer slots
pub const DEFAULT_RX_BUFFER_SIZE: usize = 128;

/// Transmit ring buffer slots
pub const DEFAULT_TX_BUFFER_SIZE: usize = 64;

/// Counters for conditions interrupt context cannot report directly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartStats {
    /// Received bytes dropped because the RX buffer was full
    pub rx_overflows: u32,
    /// `send` calls that could not queue every byte
    pub tx_truncations: u32,
}

/// Compute the baud divisor for a 16x oversampling UART
///
/// Returns `None` if `baud` is zero, above `clock_hz / 16`, or needs a
/// divisor larger than `max_divisor`.
pub fn baud_divisor(clock_hz: u32, baud: u32, max_divisor: u16) -> Option<u16> {
    if baud == 0 || baud > clock_hz / 16 {
        return None;
    }

    // round(clock / (16 * baud)) - 1
    let clock = u64::from(clock_hz);
    let scaled = 16 * u64::from(baud);
    let divisor = (clock + scaled / 2) / scaled - 1;

    u16::try_from(divisor).ok().filter(|d| *d <= max_divisor)
}

struct UartState<'a, U, const RX: usize, const TX: usize> {
    regs: U,
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
    rx_callback: Option<&'a (dyn ByteCallback + Sync)>,
    baud_rate: Option<u32>,
    stats: UartStats,
}

/// Buffered UART driver
pub struct UartDriver<
    'a,
    U,
    const RX: usize = { DEFAULT_RX_BUFFER_SIZE },
    const TX: usize = { DEFAULT_TX_BUFFER_SIZE },
> {
    state: Mutex<CriticalSectionRawMutex, RefCell<UartState<'a, U, RX, TX>>>,
}

impl<'a, U, const RX: usize, const TX: usize> UartDriver<'a, U, RX, TX>
where
    U: UartRegisters,
{
    /// Take ownership of a peripheral
    ///
    /// The peripheral stays disabled until [`configure`](Self::configure)
    /// succeeds.
    pub const fn new(regs: U) -> Self {
        Self {
            state: Mutex::new(RefCell::new(UartState {
                regs,
                rx: RingBuffer::new(),
                tx: RingBuffer::new(),
                rx_callback: None,
                baud_rate: None,
                stats: UartStats {
                    rx_overflows: 0,
                    tx_truncations: 0,
                },
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut UartState<'a, U, RX, TX>) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }

    /// Configure for 8-N-1 at `baud` and enable the peripheral
    pub fn configure(&self, baud: u32) -> Result<(), Error> {
        self.configure_with(&UartConfig::with_baudrate(baud))
    }

    /// Configure the peripheral and enable it
    ///
    /// Fails with [`Error::UnsupportedBaudRate`] if the rate exceeds
    /// `clock / 16` or the divisor does not fit the register; the peripheral
    /// is left untouched in that case.
    pub fn configure_with(&self, config: &UartConfig) -> Result<(), Error> {
        let result = self.with(|s| {
            let clock_hz = s.regs.clock_hz();
            let divisor = baud_divisor(clock_hz, config.baudrate, U::MAX_DIVISOR)
                .ok_or(Error::UnsupportedBaudRate)?;

            s.regs.set_divisor(divisor);
            s.regs
                .set_format(config.data_bits, config.parity, config.stop_bits);
            s.regs.enable();
            s.baud_rate = Some(config.baudrate);
            Ok(divisor)
        });

        match result {
            Ok(divisor) => {
                info!("UART at {} baud (divisor {})", config.baudrate, divisor);
                Ok(())
            }
            Err(e) => {
                warn!("UART rejected {} baud", config.baudrate);
                Err(e)
            }
        }
    }

    /// Baud rate of the last successful configuration
    pub fn baud_rate(&self) -> Option<u32> {
        self.with(|s| s.baud_rate)
    }

    /// Queue bytes for interrupt-driven transmission
    ///
    /// Accepts as many bytes as fit in the TX buffer and returns that count;
    /// the rest are dropped.
    pub fn send(&self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }

        let accepted = self.with(|s| {
            let accepted = s.tx.write(data);
            if accepted > 0 {
                s.regs.set_tx_empty_interrupt(true);
            }
            if accepted < data.len() {
                s.stats.tx_truncations = s.stats.tx_truncations.wrapping_add(1);
            }
            accepted
        });

        if accepted < data.len() {
            warn!("TX buffer full: queued {} of {} bytes", accepted, data.len());
        }
        accepted
    }

    /// Queue all of `data` or nothing
    pub fn send_all(&self, data: &[u8]) -> Result<(), Error> {
        self.with(|s| {
            if s.tx.free() < data.len() {
                return Err(Error::BufferOverflow);
            }
            if s.tx.write(data) > 0 {
                s.regs.set_tx_empty_interrupt(true);
            }
            Ok(())
        })
    }

    /// Move up to `buf.len()` received bytes into `buf`
    pub fn receive(&self, buf: &mut [u8]) -> usize {
        self.with(|s| s.rx.read(buf))
    }

    /// Number of received bytes waiting
    pub fn can_read(&self) -> usize {
        self.with(|s| s.rx.available())
    }

    /// Next received byte, without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.with(|s| s.rx.peek())
    }

    /// Discard everything received so far
    pub fn flush_receive(&self) {
        self.with(|s| s.rx.flush());
    }

    /// Drop queued bytes that have not reached the data register yet
    ///
    /// A byte already in the shift register still goes out.
    pub fn flush_transmit(&self) {
        self.with(|s| {
            s.tx.flush();
            s.regs.set_tx_empty_interrupt(false);
        });
    }

    /// Returns true once every queued byte has been handed to the hardware
    pub fn is_transmit_idle(&self) -> bool {
        self.with(|s| s.tx.is_empty())
    }

    /// Register (or clear) the per-byte receive callback
    pub fn set_byte_received_callback(&self, callback: Option<&'a (dyn ByteCallback + Sync)>) {
        self.with(|s| s.rx_callback = callback);
    }

    /// Send one byte synchronously, bypassing the TX buffer
    ///
    /// This is a blocking call: it polls the "data register empty" flag up
    /// to `spin_limit` times and fails with [`Error::Timeout`] if it never
    /// sets. Interrupts stay enabled between polls. Bytes still queued
    /// through [`send`](Self::send) may interleave with it.
    pub fn write_byte_blocking(&self, byte: u8, spin_limit: u32) -> Result<(), Error> {
        for _ in 0..spin_limit.max(1) {
            let written = self.with(|s| {
                if s.regs.is_data_register_empty() {
                    s.regs.write_data(byte);
                    true
                } else {
                    false
                }
            });
            if written {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(Error::Timeout)
    }

    /// Send a string synchronously, byte by byte
    ///
    /// Blocking; see [`write_byte_blocking`](Self::write_byte_blocking).
    /// Returns the number of bytes written.
    pub fn write_str_blocking(&self, s: &str, spin_limit: u32) -> Result<usize, Error> {
        for &byte in s.as_bytes() {
            self.write_byte_blocking(byte, spin_limit)?;
        }
        Ok(s.len())
    }

    /// Counters since construction
    pub fn stats(&self) -> UartStats {
        self.with(|s| s.stats)
    }

    /// Run `f` with exclusive access to the peripheral
    pub fn with_registers<R>(&self, f: impl FnOnce(&mut U) -> R) -> R {
        self.with(|s| f(&mut s.regs))
    }

    /// Receive-complete interrupt handler
    ///
    /// Stores the byte (or counts it as an overflow) and then runs the
    /// registered callback outside the critical section.
    pub fn on_rx_interrupt(&self) {
        let (byte, stored, callback) = self.with(|s| {
            let byte = s.regs.read_data();
            let stored = s.rx.push(byte);
            if !stored {
                s.stats.rx_overflows = s.stats.rx_overflows.wrapping_add(1);
            }
            (byte, stored, s.rx_callback)
        });

        if !stored {
            warn!("RX overflow, dropped {=u8:#x}", byte);
        }
        if let Some(callback) = callback {
            callback.byte_received(byte);
        }
    }

    /// Transmit-data-register-empty interrupt handler
    ///
    /// Moves one byte to the hardware and disarms itself once the TX buffer
    /// has drained.
    pub fn on_tx_empty_interrupt(&self) {
        self.with(|s| {
            if let Some(byte) = s.tx.pop() {
                s.regs.write_data(byte);
            }
            if s.tx.is_empty() {
                s.regs.set_tx_empty_interrupt(false);
            }
        });
    }

    /// Disable the peripheral and give it back
    pub fn free(self) -> U {
        let mut state = self.state.into_inner().into_inner();
        state.regs.disable();
        state.regs
    }
}
