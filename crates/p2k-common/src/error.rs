//! Error types for prokka2kegg

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for prokka2kegg operations
pub type Result<T> = std::result::Result<T, P2kError>;

/// Main error type for prokka2kegg
///
/// A lookup miss is not represented here: an identifier without KO codes is a
/// normal, empty resolution.
#[derive(Error, Debug)]
pub enum P2kError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A recognized annotation line did not carry its expected value.
    #[error("Parse error in {} at line {line_number}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line_number: usize,
        message: String,
    },

    /// A lookup table row without an identifier/code pair.
    #[error("Malformed lookup table row {line_number}: {line:?}")]
    MalformedTable { line_number: usize, line: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl P2kError {
    /// Attach a path to an IO error
    pub fn file(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error came from malformed input rather than the environment
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MalformedTable { .. })
    }
}
