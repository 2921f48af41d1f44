//! Semantic application events.
//!
//! These are application-level occurrences, distinct from raw key or mouse
//! input, and are the keys on which scheduled plugin jobs are dispatched.

use serde::{Deserialize, Serialize};

/// A semantic event raised by the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// Raised on every tick of the host loop, whether or not anything changed.
    Tick,
    /// Raised when the displayed subject (the current image) changes.
    ImgChange,
}

impl Event {
    /// Returns the event name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::ImgChange => "img_change",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
