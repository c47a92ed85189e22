//! Link configuration
//!
//! Both ends of the link must agree on the baud rate and on which level of
//! the enable line means "bus active".

use wdc_protocol::{DEFAULT_BAUD_RATE, MAX_BAUD_RATE};

use crate::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Level of the enable line that marks an in-progress frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnablePolarity {
    /// Falling edge starts a frame, rising edge ends it
    #[default]
    ActiveLow,
    /// Rising edge starts a frame, falling edge ends it
    ///
    /// The enable line must idle low: a pull-down, or a pin whose
    /// [`EnableLine::release_to`](wdc_hal::EnableLine::release_to) selects
    /// one.
    ActiveHigh,
}

impl EnablePolarity {
    /// Interpret a sampled line level
    pub const fn is_asserted(self, high: bool) -> bool {
        match self {
            EnablePolarity::ActiveLow => !high,
            EnablePolarity::ActiveHigh => high,
        }
    }

    /// Line level to drive while holding the bus
    pub const fn active_level(self) -> bool {
        matches!(self, EnablePolarity::ActiveHigh)
    }

    /// Line level of an idle bus
    pub const fn idle_level(self) -> bool {
        !self.active_level()
    }
}

/// Physical link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// UART baud rate
    pub baud_rate: u32,
    /// Enable line polarity
    pub polarity: EnablePolarity,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            polarity: EnablePolarity::ActiveLow,
        }
    }
}

impl LinkConfig {
    /// Check the configuration against protocol limits
    ///
    /// The hardware limit (`clock / 16`) is checked separately when the UART
    /// is configured.
    pub fn validate(&self) -> Result<(), Error> {
        if self.baud_rate == 0 || self.baud_rate > MAX_BAUD_RATE {
            return Err(Error::UnsupportedBaudRate);
        }
        Ok(())
    }
}
