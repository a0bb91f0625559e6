// ── Core error types ──
//
// Only contract violations are errors here. Bad input data is reported
// through `Issue`, and a failing reader through `SourceError`, which the
// scan pipeline downgrades to an issue.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Ingestion was attempted after the builder was sealed by `finalize()`.
    #[error("graph is sealed: cannot {operation} after finalize()")]
    GraphSealed { operation: &'static str },
}

/// Failure of a whole source reader.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{what} not found at {path}")]
    Missing { what: String, path: String },

    #[error("cannot read {what}: {reason}")]
    Unreadable { what: String, reason: String },

    #[error("{what} has an unexpected format: {reason}")]
    Format { what: String, reason: String },

    #[error("{what} did not respond within {timeout_secs}s")]
    Timeout { what: String, timeout_secs: u64 },
}

impl SourceError {
    pub fn missing(what: impl Into<String>, path: impl std::fmt::Display) -> Self {
        Self::Missing {
            what: what.into(),
            path: path.to_string(),
        }
    }

    pub fn unreadable(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Unreadable {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn format(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Format {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}
