//! Button sampler.
//!
//! ## Hardware
//!
//! Momentary switch, by default wired to ground with the internal pull-up
//! enabled (active-low).  The sampler reads the electrical level through the
//! [`GpioPort`] and maps it through the configured [`Polarity`]; everything
//! downstream sees only [`LineState`](crate::pins::LineState).
//!
//! No retries: a failed read is returned to the caller, which treats it as
//! fatal.

use std::sync::Arc;
use std::time::Instant;

use crate::app::events::RawSample;
use crate::app::ports::{GpioError, GpioPort};
use crate::pins::{PinId, Polarity, Pull};

pub struct PinSampler {
    gpio: Arc<dyn GpioPort>,
    pin: PinId,
    polarity: Polarity,
}

impl PinSampler {
    pub fn new(gpio: Arc<dyn GpioPort>, pin: PinId, polarity: Polarity) -> Self {
        Self { gpio, pin, polarity }
    }

    /// Configure the input line.  Startup only.
    pub fn configure(&self, pull: Pull) -> Result<(), GpioError> {
        self.gpio.configure_input(self.pin, pull)
    }

    /// GPIO pin this button is attached to.
    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Read the line once and timestamp it.
    pub fn sample(&self) -> Result<RawSample, GpioError> {
        let level = self.gpio.read(self.pin)?;
        Ok(RawSample {
            state: self.polarity.decode(level),
            observed_at: Instant::now(),
        })
    }
}
