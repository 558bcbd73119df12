//! Custom error types for the threatscore engine.
//!
//! Scoring operations never fail past their public boundary; these errors
//! only surface from taxonomy loading, mapper construction and the CLI.

use std::path::PathBuf;

/// The main error type for threatscore operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// I/O error (taxonomy or input file read/write)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Regex compilation error
    #[error("Invalid regex pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Taxonomy tables failed validation
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    /// Input could not be analysed (non-finite score, wrong shape, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Thread pool initialization error
    #[error("Failed to initialize thread pool: {0}")]
    ThreadPool(String),
}

/// Result type alias using ScoringError
pub type ScoringResult<T> = Result<T, ScoringError>;

impl ScoringError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a regex error with pattern context
    pub fn regex(source: regex::Error, pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            source,
        }
    }

    pub fn invalid_taxonomy(message: impl Into<String>) -> Self {
        Self::InvalidTaxonomy(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for ScoringError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
