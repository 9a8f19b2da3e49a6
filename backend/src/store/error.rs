//! Storage-specific error types
//!
//! Errors that can occur while appending to the chat log or reading/writing media.

use thiserror::Error;

/// Errors that can occur in the message store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input was rejected before anything was written (e.g. an empty body)
    #[error("{0}")]
    InvalidInput(String),

    /// No media exists under the requested ref
    #[error("Media not found: {0}")]
    NotFound(String),

    /// The underlying file system operation failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}
