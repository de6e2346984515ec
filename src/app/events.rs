//! Values flowing through the pipeline, plus the outbound application
//! events the core reports through the [`EventSink`](super::ports::EventSink)
//! port.

use std::time::{Duration, Instant};

use crate::pins::LineState;
use crate::shutdown::ShutdownReason;

/// One observation of the input line.  Produced every sampling tick and
/// dropped as soon as the debouncer has looked at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub state: LineState,
    pub observed_at: Instant,
}

/// A transition that survived the quiet period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncedEdge {
    pub state: LineState,
    pub fired_at: Instant,
}

/// Transport-facing message derived from an accepted edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPayload {
    asserted: bool,
}

impl NotificationPayload {
    pub const ON: &'static str = "ON";
    pub const OFF: &'static str = "OFF";

    pub fn new(asserted: bool) -> Self {
        Self { asserted }
    }

    pub fn from_edge(edge: &DebouncedEdge) -> Self {
        Self::new(edge.state.is_asserted())
    }

    pub fn asserted(&self) -> bool {
        self.asserted
    }

    pub fn as_str(&self) -> &'static str {
        if self.asserted { Self::ON } else { Self::OFF }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// All loops are running.  Carries the input pin and topic.
    Started { pin: u8, topic: String },

    /// The debouncer accepted a transition.
    EdgeDebounced(DebouncedEdge),

    /// An edge arrived inside the cooldown window and was dropped.
    Suppressed { state: LineState, remaining: Duration },

    /// A notification was handed to the broker.
    Published { topic: String, payload: NotificationPayload },

    /// The publish capability reported an error.  The cooldown still applies.
    PublishFailed { topic: String, reason: String },

    /// Shutdown was requested.
    Shutdown(ShutdownReason),
}
