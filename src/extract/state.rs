//! Extraction state definitions
//!
//! ```text
//! Init -> Fetching (loop) -> {Exhausted | LimitReached} -> Done
//!            \-> Failed
//! ```

use std::fmt;

/// Represents the current state of an extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionState {
    // ===== Active States =====
    /// Nothing requested yet
    Init,

    /// Pages are being fetched and records produced
    Fetching,

    // ===== Draining States =====
    /// The server returned no further cursor
    Exhausted,

    /// The item cap was reached
    LimitReached,

    // ===== Terminal States =====
    /// The consumer has observed the end of the sequence
    Done,

    /// An unrecoverable fetch error was returned to the consumer
    Failed,
}

impl ExtractionState {
    /// Returns true if no further records can be produced
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true while requests may still be issued
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Init | Self::Fetching)
    }

    /// Returns true if this transition is part of the state machine
    pub fn can_transition_to(&self, next: Self) -> bool {
        use ExtractionState::*;
        matches!(
            (self, next),
            (Init, Fetching)
                | (Init, LimitReached)
                | (Init, Failed)
                | (Fetching, Fetching)
                | (Fetching, Exhausted)
                | (Fetching, LimitReached)
                | (Fetching, Failed)
                | (Exhausted, Done)
                | (LimitReached, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetching => "fetching",
            Self::Exhausted => "exhausted",
            Self::LimitReached => "limit_reached",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
