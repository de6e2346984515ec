//! `embedded-hal` GPIO adapter.
//!
//! Wraps one input pin and an optional output pin that implement the
//! `embedded_hal::digital` traits and exposes them through [`GpioPort`].
//! Pin direction and bias are fixed when the pins are created by the
//! board-specific opener (see `rpi`); `configure_*` only enables a line that
//! the adapter already owns, and refuses an input bias other than the one
//! the pin was opened with.
//!
//! The pins sit behind one lock so the sampler and the indicator mirror can
//! share the adapter.  `close()` drops the pins, which returns them to the
//! backend (rppal restores their previous mode on drop).

use std::sync::{Mutex, MutexGuard};

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use crate::app::ports::{GpioError, GpioPort};
use crate::pins::{Level, PinId, Pull};

struct Line<P> {
    id: PinId,
    pin: P,
    enabled: bool,
}

impl<P> Line<P> {
    fn new(id: PinId, pin: P) -> Self {
        Self {
            id,
            pin,
            enabled: false,
        }
    }
}

struct Lines<I, O> {
    input: Line<I>,
    input_pull: Pull,
    output: Option<Line<O>>,
}

pub struct HalGpio<I, O> {
    lines: Mutex<Option<Lines<I, O>>>,
}

impl<I, O> HalGpio<I, O>
where
    I: InputPin + Send,
    O: OutputPin + Send,
{
    /// `input_pull` is the bias the opener already applied to `input`.
    pub fn new(input_id: PinId, input_pull: Pull, input: I, output: Option<(PinId, O)>) -> Self {
        Self {
            lines: Mutex::new(Some(Lines {
                input: Line::new(input_id, input),
                input_pull,
                output: output.map(|(id, pin)| Line::new(id, pin)),
            })),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self.lines.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    fn with_lines<T>(
        &self,
        f: impl FnOnce(&mut Lines<I, O>) -> Result<T, GpioError>,
    ) -> Result<T, GpioError> {
        let mut guard: MutexGuard<'_, Option<Lines<I, O>>> = self
            .lines
            .lock()
            .map_err(|_| GpioError::Io("GPIO lock poisoned".into()))?;
        match guard.as_mut() {
            Some(lines) => f(lines),
            None => Err(GpioError::Closed),
        }
    }
}

impl<I, O> GpioPort for HalGpio<I, O>
where
    I: InputPin + Send,
    O: OutputPin + Send,
{
    fn configure_input(&self, pin: PinId, pull: Pull) -> Result<(), GpioError> {
        self.with_lines(|lines| {
            if lines.input.id != pin {
                return Err(GpioError::PinUnavailable(pin));
            }
            if lines.input_pull != pull {
                warn!(
                    "GPIO{} opened with pull {:?}, refusing {:?}",
                    pin, lines.input_pull, pull
                );
                return Err(GpioError::PinUnavailable(pin));
            }
            lines.input.enabled = true;
            debug!("GPIO{} input enabled (pull={:?})", pin, pull);
            Ok(())
        })
    }

    fn configure_output(&self, pin: PinId) -> Result<(), GpioError> {
        self.with_lines(|lines| {
            let line = match lines.output.as_mut() {
                Some(line) if line.id == pin => line,
                _ => return Err(GpioError::PinUnavailable(pin)),
            };
            line.pin
                .set_low()
                .map_err(|e| GpioError::Io(format!("GPIO{pin}: {e:?}")))?;
            line.enabled = true;
            debug!("GPIO{} output enabled", pin);
            Ok(())
        })
    }

    fn read(&self, pin: PinId) -> Result<Level, GpioError> {
        self.with_lines(|lines| {
            let line = &mut lines.input;
            if line.id != pin || !line.enabled {
                return Err(GpioError::NotConfigured(pin));
            }
            line.pin
                .is_high()
                .map(Level::from_high)
                .map_err(|e| GpioError::Io(format!("GPIO{pin}: {e:?}")))
        })
    }

    fn write(&self, pin: PinId, level: Level) -> Result<(), GpioError> {
        self.with_lines(|lines| {
            let line = match lines.output.as_mut() {
                Some(line) if line.id == pin && line.enabled => line,
                _ => return Err(GpioError::NotConfigured(pin)),
            };
            let res = match level {
                Level::High => line.pin.set_high(),
                Level::Low => line.pin.set_low(),
            };
            res.map_err(|e| GpioError::Io(format!("GPIO{pin}: {e:?}")))
        })
    }

    fn close(&self) {
        let mut guard = match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.take().is_some() {
            debug!("GPIO lines released");
        }
    }
}
