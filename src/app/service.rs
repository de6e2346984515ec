//! Notifier service: throttle plus dispatcher behind one entry point.
//!
//! [`NotifyService`] owns the cooldown and the publish port.  It is driven
//! one edge at a time, in arrival order, by the notifier thread.  Every
//! decision is reported through the [`EventSink`] port.
//!
//! ```text
//!  DebouncedEdge ──▶ ┌───────────────────────────┐ ──▶ PublishPort
//!                    │       NotifyService       │
//!                    │  PublishThrottle · Disp.  │ ──▶ EventSink
//!                    └───────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::DoorbellConfig;

use super::dispatch::Dispatcher;
use super::events::{AppEvent, DebouncedEdge, NotificationPayload};
use super::ports::{EventSink, PublishPort};
use super::throttle::{Admission, PublishThrottle};

/// What happened to one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Dropped inside the cooldown window.
    Suppressed { remaining: Duration },
    /// Handed to the broker.
    Published(NotificationPayload),
    /// Accepted by the throttle, but the publish call failed.
    Failed(String),
}

pub struct NotifyService<P: PublishPort> {
    throttle: PublishThrottle,
    dispatcher: Dispatcher<P>,
    published: u64,
    suppressed: u64,
    failed: u64,
}

impl<P: PublishPort> NotifyService<P> {
    pub fn new(throttle_window: Duration, publisher: P, topic: impl Into<String>, retain: bool) -> Self {
        Self {
            throttle: PublishThrottle::new(throttle_window),
            dispatcher: Dispatcher::new(publisher, topic, retain),
            published: 0,
            suppressed: 0,
            failed: 0,
        }
    }

    pub fn from_config(config: &DoorbellConfig, publisher: P) -> Self {
        Self::new(
            config.throttle_window(),
            publisher,
            config.topic.clone(),
            config.retain,
        )
    }

    /// Run one edge through the cooldown and, if admitted, the dispatcher.
    ///
    /// The cooldown is charged before the publish attempt, so a failure
    /// still blocks the next window.
    pub fn handle_edge(
        &mut self,
        edge: DebouncedEdge,
        now: Instant,
        sink: &mut impl EventSink,
    ) -> EdgeOutcome {
        sink.emit(&AppEvent::EdgeDebounced(edge));

        if let Admission::Suppressed { remaining } = self.throttle.admit(now) {
            self.suppressed += 1;
            sink.emit(&AppEvent::Suppressed {
                state: edge.state,
                remaining,
            });
            return EdgeOutcome::Suppressed { remaining };
        }

        info!("Button event! asserted={}", edge.state.is_asserted());

        let topic = self.dispatcher.topic().to_owned();
        match self.dispatcher.dispatch(&edge) {
            Ok(payload) => {
                self.published += 1;
                sink.emit(&AppEvent::Published { topic, payload });
                EdgeOutcome::Published(payload)
            }
            Err(e) => {
                self.failed += 1;
                warn!("notification dropped: {}", e);
                let reason = e.to_string();
                sink.emit(&AppEvent::PublishFailed {
                    topic,
                    reason: reason.clone(),
                });
                EdgeOutcome::Failed(reason)
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn throttle_window(&self) -> Duration {
        self.throttle.window()
    }

    pub fn last_publish_at(&self) -> Option<Instant> {
        self.throttle.last_publish_at()
    }

    pub fn published_count(&self) -> u64 {
        self.published
    }

    pub fn suppressed_count(&self) -> u64 {
        self.suppressed
    }

    pub fn failed_count(&self) -> u64 {
        self.failed
    }

    pub fn publisher(&self) -> &P {
        self.dispatcher.publisher()
    }
}
