//! Port traits: the hexagonal boundary between the doorbell core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ pipeline (domain)
//! ```
//!
//! Driven adapters (GPIO, MQTT, event sinks, config files) implement these
//! traits.  The sampler, notifier and mirror consume them, so the core
//! never touches hardware or sockets directly.
//!
//! ## Concurrency notes
//!
//! - **GpioPort** is shared between threads behind an `Arc` and must accept
//!   concurrent `read` calls from the sampler and the indicator mirror.
//! - **PublishPort** is owned by the notifier thread only.
//! - `GpioPort::close` may race with in-flight reads; implementations turn
//!   late calls into [`GpioError::Closed`] rather than panicking.

use crate::config::DoorbellConfig;
use crate::pins::{Level, PinId, Pull};

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Digital line access.  Opening the capability is the adapter's
/// constructor; everything after that goes through this trait.
pub trait GpioPort: Send + Sync {
    /// Configure `pin` as an input with the given bias.
    fn configure_input(&self, pin: PinId, pull: Pull) -> Result<(), GpioError>;

    /// Configure `pin` as an output, initially driven low.
    fn configure_output(&self, pin: PinId) -> Result<(), GpioError>;

    /// Sample the electrical level of an input.
    fn read(&self, pin: PinId) -> Result<Level, GpioError>;

    /// Drive an output to `level`.
    fn write(&self, pin: PinId, level: Level) -> Result<(), GpioError>;

    /// Release every line.  Idempotent: the second and later calls are no-ops.
    fn close(&self);
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget notification delivery.  The session is assumed to be
/// established already; connect/reconnect is the adapter's business.
pub trait PublishPort: Send {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go.
pub trait EventSink: Send {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists the doorbell configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] instead of clamping.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] when no stored
    /// config exists; callers fall back to [`DoorbellConfig::default()`].
    fn load(&self) -> Result<DoorbellConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DoorbellConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`GpioPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// The GPIO peripheral could not be opened (permissions, wrong board).
    Unavailable(String),
    /// The pin does not exist or is already claimed elsewhere.
    PinUnavailable(PinId),
    /// The pin was never configured, or configured in the other direction.
    NotConfigured(PinId),
    /// The capability has been closed.
    Closed,
    /// Generic I/O error from the backend.
    Io(String),
}

/// Errors from [`PublishPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The broker could not be reached or refused the session.
    Connect(String),
    /// The publish request could not be queued or sent.
    Send(String),
}

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config could not be parsed.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` names the field and the rule.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(String),
}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "GPIO unavailable: {}", msg),
            Self::PinUnavailable(pin) => write!(f, "GPIO{} unavailable", pin),
            Self::NotConfigured(pin) => write!(f, "GPIO{} not configured for this direction", pin),
            Self::Closed => write!(f, "GPIO closed"),
            Self::Io(msg) => write!(f, "GPIO I/O error: {}", msg),
        }
    }
}

impl core::fmt::Display for PublishError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "broker connect failed: {}", msg),
            Self::Send(msg) => write!(f, "publish failed: {}", msg),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for GpioError {}
impl std::error::Error for PublishError {}
impl std::error::Error for ConfigError {}
