//! Error types for the showcase pipelines.
//!
//! Library crates use [`ShowcaseError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.
//!
//! A merge that computes a state identical to what is already persisted is
//! *not* an error; pipelines report it through an outcome value with
//! `changed = false` (see `MergeOutcome` in [`crate::types`]).

use std::path::PathBuf;

/// Top-level error type for all pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum ShowcaseError {
    /// Submission text or an embedded structured block could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A required field is missing or a value fails type/format constraints.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A create was requested where a record already exists.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The target record or cohort data store does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Structured data (YAML/JSON) serialization or deserialization error.
    #[error("data error: {0}")]
    Data(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShowcaseError>;

impl ShowcaseError {
    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a conflict error from any displayable message.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict {
            message: msg.into(),
        }
    }

    /// Create a not-found error from any displayable message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ShowcaseError::validation("event 'Kickoff' has an invalid date");
        assert_eq!(
            err.to_string(),
            "validation error: event 'Kickoff' has an invalid date"
        );

        let err = ShowcaseError::not_found("data file for cohort 2025");
        assert!(err.to_string().contains("cohort 2025"));
    }
}
