//! Line-level vocabulary shared by every driver and adapter.
//!
//! The GPIO capability speaks electrical [`Level`]s; the domain speaks
//! logical [`LineState`]s.  [`Polarity`] is the only place the two meet, so
//! an active-low button and an active-high LED can share one pipeline.
//!
//! Default pin assignments match the usual doorbell wiring on a
//! Raspberry Pi header (BCM numbering).

use serde::{Deserialize, Serialize};

/// BCM GPIO number.
pub type PinId = u8;

// ---------------------------------------------------------------------------
// Default wiring
// ---------------------------------------------------------------------------

/// Momentary doorbell switch to ground, internal pull-up enabled.
pub const BUTTON_GPIO: PinId = 17;

// ---------------------------------------------------------------------------
// Electrical level
// ---------------------------------------------------------------------------

/// Electrical level of a line as reported (or driven) by the GPIO capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn from_high(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }

    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

// ---------------------------------------------------------------------------
// Logical state
// ---------------------------------------------------------------------------

/// Logical state of a line.  `Asserted` means "pressed" for an input and
/// "lit" for an output, whatever the wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineState {
    Asserted,
    Released,
}

impl LineState {
    pub fn is_asserted(self) -> bool {
        self == Self::Asserted
    }
}

// ---------------------------------------------------------------------------
// Polarity
// ---------------------------------------------------------------------------

/// Mapping between a line's electrical level and its logical meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// `Low` means asserted (switch to ground with pull-up).
    ActiveLow,
    /// `High` means asserted.
    ActiveHigh,
}

impl Polarity {
    /// Electrical level → logical state.
    pub fn decode(self, level: Level) -> LineState {
        match (self, level) {
            (Self::ActiveLow, Level::Low) | (Self::ActiveHigh, Level::High) => LineState::Asserted,
            _ => LineState::Released,
        }
    }

    /// Logical state → electrical level to drive.
    pub fn encode(self, state: LineState) -> Level {
        match (self, state) {
            (Self::ActiveHigh, LineState::Asserted) | (Self::ActiveLow, LineState::Released) => {
                Level::High
            }
            _ => Level::Low,
        }
    }
}

/// Input bias applied when a pin is configured as an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull {
    Up,
    Down,
    Floating,
}
