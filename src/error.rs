// Error taxonomy of the allotment core. The core never catches and
// suppresses: every failure travels back to the caller synchronously, and
// recovery (retry, re-fetch) belongs to the surrounding application.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllotError {
    /// Bad or missing input — non-positive totals, empty branch/caste lists,
    /// zero-sum weights or percentages, illegal merge requests. Nothing is
    /// computed when this is returned.
    Validation(String),
    /// The change collides with current state: occupied slot on `add`, or a
    /// stale matrix version at save time.
    Conflict(String),
    /// The operation names something that does not exist: an unknown slot,
    /// an empty slot on `remove`, a merged group that was never created.
    State(String),
}

impl AllotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AllotError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AllotError::Conflict(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        AllotError::State(msg.into())
    }
}

impl fmt::Display for AllotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllotError::Validation(m) => write!(f, "validation error: {}", m),
            AllotError::Conflict(m) => write!(f, "conflict: {}", m),
            AllotError::State(m) => write!(f, "invalid state: {}", m),
        }
    }
}

impl Error for AllotError {}
