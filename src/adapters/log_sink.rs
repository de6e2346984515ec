//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to the
//! `log` facade (stderr via `env_logger` in the binary).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { pin, topic } => {
                info!("START | button=GPIO{} topic={}", pin, topic);
            }
            AppEvent::EdgeDebounced(edge) => {
                debug!("EDGE  | state={:?}", edge.state);
            }
            AppEvent::Suppressed { state, remaining } => {
                debug!(
                    "SKIP  | state={:?} cooldown_remaining={}ms",
                    state,
                    remaining.as_millis()
                );
            }
            AppEvent::Published { topic, payload } => {
                info!("PUB   | topic={} payload={}", topic, payload.as_str());
            }
            AppEvent::PublishFailed { topic, reason } => {
                warn!("PUB   | topic={} failed: {}", topic, reason);
            }
            AppEvent::Shutdown(reason) => {
                info!("STOP  | reason={:?}", reason);
            }
        }
    }
}
