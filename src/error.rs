//! Error types for spangle
//!
//! Most of these are recovered where they happen and only logged:
//! highlighting degrades to plain text instead of failing the caller.
//! `Io` and `Config` are the ones that actually propagate.

use thiserror::Error;

/// Result type alias for spangle operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Malformed rule #{index} in language '{language}': {reason}")]
    MalformedRule {
        language: String,
        index: usize,
        reason: String,
    },

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Language '{language}' extends itself through '{via}'")]
    CyclicExtension { language: String, via: String },

    #[error("Rule '{rule}' produced a zero-length match at offset {offset}")]
    ZeroLengthMatch { rule: String, offset: usize },

    #[error("Text of {len} bytes exceeds the {max} byte limit")]
    TextTooLarge { len: usize, max: usize },
}

impl HighlightError {
    /// Whether highlighting continues (degraded) after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, HighlightError::Io(_) | HighlightError::Config(_))
    }
}
