//! Indicator LED mirror.
//!
//! Copies the *raw* button state to an output line.  No debouncing: contact
//! chatter shows up on the LED, which is the point.  The mirror shares the
//! GPIO capability with the sampler but has no ordering relationship with
//! the notification pipeline.

use std::sync::Arc;

use crate::app::ports::{GpioError, GpioPort};
use crate::pins::{LineState, PinId, Polarity};

pub struct IndicatorMirror {
    gpio: Arc<dyn GpioPort>,
    input: PinId,
    input_polarity: Polarity,
    output: PinId,
    output_polarity: Polarity,
}

impl IndicatorMirror {
    pub fn new(
        gpio: Arc<dyn GpioPort>,
        input: PinId,
        input_polarity: Polarity,
        output: PinId,
        output_polarity: Polarity,
    ) -> Self {
        Self {
            gpio,
            input,
            input_polarity,
            output,
            output_polarity,
        }
    }

    /// Configure the output line.  Startup only.
    pub fn configure(&self) -> Result<(), GpioError> {
        self.gpio.configure_output(self.output)
    }

    pub fn output_pin(&self) -> PinId {
        self.output
    }

    /// Read the input once and drive the output to match.
    pub fn step(&mut self) -> Result<LineState, GpioError> {
        let state = self.input_polarity.decode(self.gpio.read(self.input)?);
        self.gpio
            .write(self.output, self.output_polarity.encode(state))?;
        Ok(state)
    }
}
