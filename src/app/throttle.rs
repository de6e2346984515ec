//! Publish cooldown.
//!
//! At most one notification per window.  The window is charged when an
//! edge is *accepted*, before the publish is attempted, so a broken
//! transport gets one attempt per window instead of one per press.

use std::time::{Duration, Instant};

/// Result of asking the throttle about an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Forward to the dispatcher; the window restarted at `now`.
    Accepted,
    /// Inside the cooldown.  `remaining` is how long until it reopens.
    Suppressed { remaining: Duration },
}

/// Fixed-window cooldown.  Single writer: the notifier owns it.
#[derive(Debug, Clone)]
pub struct PublishThrottle {
    window: Duration,
    last_publish_at: Option<Instant>,
}

impl PublishThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_publish_at: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_publish_at(&self) -> Option<Instant> {
        self.last_publish_at
    }

    /// Decide whether an edge observed at `now` may be published.
    pub fn admit(&mut self, now: Instant) -> Admission {
        if let Some(last) = self.last_publish_at {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.window {
                return Admission::Suppressed {
                    remaining: self.window - elapsed,
                };
            }
        }

        // Never move backwards, even if a caller hands in a stale `now`.
        let stamp = match self.last_publish_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_publish_at = Some(stamp);
        Admission::Accepted
    }
}
