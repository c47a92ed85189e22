//! Mock peripherals for unit tests

use std::collections::VecDeque;

use wdc_hal::uart::{DataBits, Parity, StopBits};
use wdc_hal::{EnableLine, UartRegisters};

/// UART registers backed by plain fields
#[derive(Debug)]
pub struct MockUart {
    pub clock_hz: u32,
    pub divisor: Option<u16>,
    pub format: Option<(DataBits, Parity, StopBits)>,
    pub enabled: bool,
    pub tx_irq: bool,
    pub data_register_empty: bool,
    /// Bytes the "wire" will deliver, one per RX interrupt
    pub incoming: VecDeque<u8>,
    /// Bytes loaded into the data register
    pub sent: Vec<u8>,
}

impl MockUart {
    pub fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            divisor: None,
            format: None,
            enabled: false,
            tx_irq: false,
            data_register_empty: true,
            incoming: VecDeque::new(),
            sent: Vec::new(),
        }
    }
}

impl UartRegisters for MockUart {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn set_divisor(&mut self, divisor: u16) {
        self.divisor = Some(divisor);
    }

    fn set_format(&mut self, data_bits: DataBits, parity: Parity, stop_bits: StopBits) {
        self.format = Some((data_bits, parity, stop_bits));
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.tx_irq = false;
    }

    fn read_data(&mut self) -> u8 {
        self.incoming.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.sent.push(byte);
    }

    fn is_data_register_empty(&self) -> bool {
        self.data_register_empty
    }

    fn set_tx_empty_interrupt(&mut self, enabled: bool) {
        self.tx_irq = enabled;
    }
}

/// Enable line shared with a simulated base
///
/// The line rests at `bias_high` unless the base asserts it or we drive the
/// opposite level. [`release_to`](EnableLine::release_to) moves the bias the
/// way a pin with a selectable pull does.
#[derive(Debug)]
pub struct MockLine {
    pub bias_high: bool,
    /// Base is pulling the line away from its bias
    pub base_asserting: bool,
    /// Level we are driving, if any
    pub driven: Option<bool>,
}

impl Default for MockLine {
    fn default() -> Self {
        Self {
            bias_high: true,
            base_asserting: false,
            driven: None,
        }
    }
}

impl EnableLine for MockLine {
    fn is_high(&mut self) -> bool {
        let idle = self.bias_high;
        if self.base_asserting || self.driven == Some(!idle) {
            !idle
        } else {
            idle
        }
    }

    fn drive(&mut self, high: bool) {
        self.driven = Some(high);
    }

    fn release(&mut self) {
        self.driven = None;
    }

    fn release_to(&mut self, idle_high: bool) {
        self.bias_high = idle_high;
        self.driven = None;
    }
}
