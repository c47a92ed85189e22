//! UART peripheral abstractions
//!
//! The link driver owns the peripheral and moves bytes in and out of it from
//! interrupt context, so the trait exposes registers rather than a blocking
//! stream API.

/// Register-level access to a UART peripheral
///
/// Implementations wrap one hardware serial port. All methods must be
/// non-blocking: they are called from interrupt handlers.
pub trait UartRegisters {
    /// Largest value the baud divisor register accepts
    ///
    /// The AVR-style `UBRR` register is 12 bits wide.
    const MAX_DIVISOR: u16 = 0x0FFF;

    /// Peripheral input clock in Hz
    fn clock_hz(&self) -> u32;

    /// Program the baud rate divisor
    fn set_divisor(&mut self, divisor: u16);

    /// Program the character format
    fn set_format(&mut self, data_bits: DataBits, parity: Parity, stop_bits: StopBits);

    /// Enable receiver, transmitter and the receive-complete interrupt
    fn enable(&mut self);

    /// Disable the peripheral and all of its interrupts
    fn disable(&mut self);

    /// Read the received byte from the data register
    fn read_data(&mut self) -> u8;

    /// Load a byte into the transmit data register
    fn write_data(&mut self, byte: u8);

    /// Check the "data register empty" flag
    fn is_data_register_empty(&self) -> bool;

    /// Arm or disarm the "transmit data register empty" interrupt
    fn set_tx_empty_interrupt(&mut self, enabled: bool);
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(9600)
    }
}

impl UartConfig {
    /// 8-N-1 at the given baud rate
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
