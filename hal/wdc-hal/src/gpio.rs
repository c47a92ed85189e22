//! Enable line abstraction
//!
//! The WDC bus uses one shared, pulled-up line to mark frame boundaries.
//! Either side may pull it to its active level; released, it floats back to
//! idle. Edge interrupts on this line are wired by the board crate to the
//! link layer's edge handler.

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, OutputPin};

/// Bidirectional frame enable line
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip. All methods are called from interrupt context.
pub trait EnableLine {
    /// Sample the current line level
    fn is_high(&mut self) -> bool;

    /// Check if the line currently reads low
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }

    /// Actively drive the line to a level
    fn drive(&mut self, high: bool);

    /// Stop driving the line and return to input with pull-up
    fn release(&mut self);

    /// Stop driving the line and let it settle at `idle_high`
    ///
    /// Pins with a selectable internal pull switch it to pull toward
    /// `idle_high`. The default suits lines with a fixed external pull-up
    /// and is plain [`release`](Self::release).
    fn release_to(&mut self, idle_high: bool) {
        let _ = idle_high;
        self.release();
    }
}

/// [`EnableLine`] over an `embedded-hal` open-drain pin
///
/// Releasing the pin lets the external pull-up restore the idle level, so
/// `release` and `drive(true)` both leave the output transistor off. The
/// line therefore idles high and suits an active-low link.
pub struct OpenDrainLine<P> {
    pin: P,
}

impl<P> OpenDrainLine<P>
where
    P: InputPin<Error = Infallible> + OutputPin,
{
    /// Wrap a pin, releasing it immediately
    pub fn new(pin: P) -> Self {
        let mut line = Self { pin };
        line.release();
        line
    }

    /// Give the pin back
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P> EnableLine for OpenDrainLine<P>
where
    P: InputPin<Error = Infallible> + OutputPin,
{
    fn is_high(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high,
            Err(never) => match never {},
        }
    }

    fn drive(&mut self, high: bool) {
        match self.pin.set_state(high.into()) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn release(&mut self) {
        self.drive(true);
    }
}
