//! Error types for the core engine.

use thiserror::Error;

/// A backend timestamp (or date key) that could not be turned into an instant.
///
/// Events carrying one of these are excluded from aggregation and reported
/// back to the caller; they are never coerced to the epoch or to "now".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The text did not parse even after repairing known backend quirks.
    #[error("malformed timestamp {raw:?}: {reason}")]
    Malformed { raw: String, reason: String },
}

impl TimestampError {
    pub(crate) fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        TimestampError::Malformed {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// The offending input text.
    pub fn raw(&self) -> &str {
        match self {
            TimestampError::Malformed { raw, .. } => raw,
        }
    }
}
