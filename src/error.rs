//! Unified error type for the doorbell.
//!
//! A single `Error` enum that every port error converts into, keeping the
//! startup path and the loops' fatal-error handling uniform.  Port-level
//! errors live next to their traits in [`crate::app::ports`].

use core::fmt;

use crate::app::ports::{ConfigError, GpioError, PublishError};

/// Every fallible operation outside the pure core funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// The GPIO capability failed to open, configure, read or write.
    Gpio(GpioError),
    /// The publish capability failed to connect or publish.
    Publish(PublishError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A worker thread or the signal handler could not be set up.
    Init(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpio(e) => Some(e),
            Self::Publish(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Init(_) => None,
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
