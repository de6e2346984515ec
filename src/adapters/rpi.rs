//! Raspberry Pi GPIO opener.
//!
//! Claims the button (and optional LED) pins through `rppal`, applies the
//! configured bias, and hands them to [`HalGpio`] via rppal's
//! `embedded-hal` implementations.

use log::{info, warn};
use rppal::gpio::{Gpio, InputPin, OutputPin};

use super::hal_gpio::HalGpio;
use crate::app::ports::GpioError;
use crate::config::DoorbellConfig;
use crate::pins::{PinId, Pull};

/// GPIO capability backed by the Pi's `/dev/gpiomem`.
pub type RpiGpio = HalGpio<InputPin, OutputPin>;

/// Open the peripheral and claim the configured pins.
pub fn open(config: &DoorbellConfig) -> Result<RpiGpio, GpioError> {
    let gpio = Gpio::new().map_err(|e| GpioError::Unavailable(e.to_string()))?;

    let button = claim(&gpio, config.button_pin)?;
    let input = match config.button_pull {
        Pull::Up => button.into_input_pullup(),
        Pull::Down => button.into_input_pulldown(),
        Pull::Floating => button.into_input(),
    };

    let output = match config.led_pin {
        Some(led) => Some((led, claim(&gpio, led)?.into_output_low())),
        None => None,
    };

    info!(
        "GPIO open: button=GPIO{} ({:?}, pull {:?}) led={:?}",
        config.button_pin, config.button_polarity, config.button_pull, config.led_pin
    );
    Ok(HalGpio::new(config.button_pin, config.button_pull, input, output))
}

fn claim(gpio: &Gpio, pin: PinId) -> Result<rppal::gpio::Pin, GpioError> {
    gpio.get(pin).map_err(|e| {
        warn!("GPIO{} claim failed: {}", pin, e);
        GpioError::PinUnavailable(pin)
    })
}
