//! Typed error handling for constviz.
//!
//! Every failure inside the core is caught at the operation boundary and
//! turned into a safe result; these types carry enough context (source id,
//! offending text) to reproduce the problem from the log line alone.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for constviz operations.
#[derive(Error, Debug)]
pub enum ConstvizError {
    /// I/O error when reading source units or configuration
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Declaration extraction failed for one source unit
    #[error("Extraction failed in {source_id}: {message}")]
    Extraction {
        source_id: String,
        message: String,
        /// Byte offset of the offending text, if known
        offset: Option<usize>,
        /// The offending text itself (truncated)
        text: Option<String>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A full rebuild was requested while another one is still running
    #[error("Rebuild already in flight")]
    RebuildInFlight,

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Longest offending-text excerpt kept in an extraction error.
const MAX_EXCERPT_CHARS: usize = 80;

impl ConstvizError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an extraction error pointing at the offending text.
    pub fn extraction_at(
        source_id: impl Into<String>,
        message: impl Into<String>,
        offset: usize,
        text: &str,
    ) -> Self {
        Self::Extraction {
            source_id: source_id.into(),
            message: message.into(),
            offset: Some(offset),
            text: Some(text.chars().take(MAX_EXCERPT_CHARS).collect()),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Convenience type alias for constviz results.
pub type ConstvizResult<T> = Result<T, ConstvizError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> ConstvizResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ConstvizResult<T> {
        self.map_err(|e| ConstvizError::io(path, e))
    }
}
