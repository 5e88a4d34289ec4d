//! Error types for ESC/POS construction

use thiserror::Error;

/// ESC/POS construction error types
#[derive(Debug, Error)]
pub enum EscposError {
    /// Unknown code page name
    #[error("Unknown code page: {0}")]
    UnknownCodePage(String),

    /// Image cannot be rendered (empty, undecodable, too wide)
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for ESC/POS operations
pub type EscposResult<T> = Result<T, EscposError>;
