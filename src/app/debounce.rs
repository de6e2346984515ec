//! Quiet-period debouncer.
//!
//! Turns a stream of [`RawSample`]s into a sparse stream of
//! [`DebouncedEdge`]s.  The line has to sit in a new state for the whole
//! window before the change is believed:
//!
//! ```text
//!  raw      ‾‾‾‾|_|‾|__|‾|________________________
//!  pending  ‾‾‾‾|_|‾|__|‾|________________________
//!  deadline      ^ ^ ^  ^ ^─── window ───^
//!  edge                                  ▼ Released→Asserted
//! ```
//!
//! Every change of the pending state pushes the deadline out again, so
//! chatter that never settles for a full window never fires.  There is at
//! most one outstanding deadline at any time, held as a plain value and
//! compared against each sample's timestamp.

use std::time::{Duration, Instant};

use super::events::{DebouncedEdge, RawSample};
use crate::pins::LineState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No sample seen yet.
    Unseeded,
    /// Pending state equals the reported state and no deadline is armed.
    Stable { reported: LineState },
    /// The line moved; `pending` must hold until `deadline`.
    Settling {
        reported: LineState,
        pending: LineState,
        deadline: Instant,
    },
}

/// Single-owner debounce state machine.  Only the sampler thread touches it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    phase: Phase,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            phase: Phase::Unseeded,
        }
    }

    /// Start from a known stable state instead of seeding from the first
    /// sample.
    pub fn with_state(window: Duration, state: LineState) -> Self {
        Self {
            window,
            phase: Phase::Stable { reported: state },
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Last state reported downstream (or seeded).
    pub fn reported(&self) -> Option<LineState> {
        match self.phase {
            Phase::Unseeded => None,
            Phase::Stable { reported } | Phase::Settling { reported, .. } => Some(reported),
        }
    }

    /// Whether a deadline is currently armed.
    pub fn is_settling(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    /// Feed one sample.  Returns an edge when the pending state has been
    /// held for the full window and differs from what was last reported.
    pub fn sample(&mut self, sample: RawSample) -> Option<DebouncedEdge> {
        let RawSample { state, observed_at } = sample;

        match self.phase {
            Phase::Unseeded => {
                // First observation is the baseline, not a transition.
                self.phase = Phase::Stable { reported: state };
                None
            }

            Phase::Stable { reported } => {
                if state != reported {
                    self.phase = Phase::Settling {
                        reported,
                        pending: state,
                        deadline: observed_at + self.window,
                    };
                }
                None
            }

            Phase::Settling {
                reported,
                pending,
                deadline,
            } => {
                if state != pending {
                    self.phase = Phase::Settling {
                        reported,
                        pending: state,
                        deadline: observed_at + self.window,
                    };
                    return None;
                }

                if observed_at < deadline {
                    return None;
                }

                self.phase = Phase::Stable { reported: pending };
                if pending == reported {
                    // Bounced out and back: nothing to report.
                    None
                } else {
                    Some(DebouncedEdge {
                        state: pending,
                        fired_at: observed_at,
                    })
                }
            }
        }
    }
}
