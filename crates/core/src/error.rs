//! Error types for the BPE tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// No coarse token reached the minimum frequency (strict training only)
    #[error("Empty corpus: no token occurs at least {min_frequency} times")]
    EmptyCorpus { min_frequency: u64 },

    /// Malformed, truncated or inconsistent model artifact
    #[error("Format error in {field}: {reason}")]
    Format { field: String, reason: String },

    /// I/O error with file context
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid merge rule
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),
}

impl TokenizerError {
    /// Build a [`TokenizerError::Format`] for the given field.
    pub fn format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_field() {
        let err = TokenizerError::format("merges[3]", "unknown symbol 'zz'");
        assert_eq!(
            err.to_string(),
            "Format error in merges[3]: unknown symbol 'zz'"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = TokenizerError::io("model.json", io);
        assert!(err.to_string().contains("model.json"));
        assert!(err.source().is_some());
    }
}
