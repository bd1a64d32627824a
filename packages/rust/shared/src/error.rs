//! Error types for MeetBrief.
//!
//! Library crates use [`MeetBriefError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all MeetBrief operations.
#[derive(Debug, thiserror::Error)]
pub enum MeetBriefError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to a search provider or the model API.
    #[error("network error: {0}")]
    Network(String),

    /// Keyword-search provider error (request, status, or response shape).
    #[error("search error: {0}")]
    Search(String),

    /// Semantic-search provider error (request, status, or response shape).
    #[error("semantic search error: {0}")]
    Semantic(String),

    /// Model execution engine error (API or response parsing).
    #[error("engine error: {0}")]
    Engine(String),

    /// A pipeline stage failed unrecoverably.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// Data validation error (empty request fields, missing dependency, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MeetBriefError>;

impl MeetBriefError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a stage-failure error carrying the stage name.
    pub fn stage(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
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
        let err = MeetBriefError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = MeetBriefError::stage("Research", "model returned no content");
        assert_eq!(
            err.to_string(),
            "stage 'Research' failed: model returned no content"
        );
    }

    #[test]
    fn validation_error_carries_message() {
        let err = MeetBriefError::validation("participants must not be empty");
        assert!(err.to_string().contains("participants"));
    }
}
