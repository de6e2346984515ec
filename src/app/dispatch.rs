//! Edge → broker.
//!
//! Builds the payload and calls the publish port synchronously.  No retry,
//! no backoff: a failed publish comes back as an error for the caller to
//! log, and nothing upstream is rolled back.

use log::debug;

use super::events::{DebouncedEdge, NotificationPayload};
use super::ports::{PublishError, PublishPort};

pub struct Dispatcher<P: PublishPort> {
    publisher: P,
    topic: String,
    retain: bool,
}

impl<P: PublishPort> Dispatcher<P> {
    pub fn new(publisher: P, topic: impl Into<String>, retain: bool) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            retain,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Publish the notification for `edge`.  Returns the payload that was
    /// handed to the transport.
    pub fn dispatch(&mut self, edge: &DebouncedEdge) -> Result<NotificationPayload, PublishError> {
        let payload = NotificationPayload::from_edge(edge);
        debug!(
            "publish topic={} payload={} retain={}",
            self.topic,
            payload.as_str(),
            self.retain
        );
        self.publisher
            .publish(&self.topic, payload.as_bytes(), self.retain)?;
        Ok(payload)
    }
}
