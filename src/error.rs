//! Error types for manifest-fixer.
//!
//! All operations return `Result<T>` which aliases `Result<T, FixerError>`.

use thiserror::Error;

/// Errors from manifest fix operations.
#[derive(Debug, Error)]
pub enum FixerError {
    /// An attribute already holds a value that contradicts the requested one.
    ///
    /// Fatal: the output of a run that hits this must not be used.
    #[error(
        "Conflicting value for android:{attribute} in <{element}>: manifest has '{existing}', build requests '{requested}'"
    )]
    Conflict {
        element: String,
        attribute: String,
        existing: String,
        requested: String,
    },

    /// Version token is neither a number nor a codename.
    #[error("Invalid version '{0}': {1}")]
    MalformedVersion(String, String),

    /// Document is not an Android manifest.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Rejected command-line argument combination.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// XML parse error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Regex compilation failed (indicates bug).
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for manifest-fixer operations.
pub type Result<T> = std::result::Result<T, FixerError>;
