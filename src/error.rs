//! Error handling for cookieheap

use thiserror::Error;

/// Main error type for cookieheap operations
#[derive(Error, Debug)]
pub enum HeapError {
    /// The holder could not be reached or did not answer.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No cookies collected yet")]
    EmptyBuffer,

    #[error("Active tab error: {0}")]
    ActiveTab(String),

    #[error("Browser cookie error: {0}")]
    BrowserCookie(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl HeapError {
    /// True when the failure came from a platform collaborator
    /// (tab lookup, cookie store, clipboard) rather than the holder.
    pub fn is_collaborator(&self) -> bool {
        !matches!(
            self,
            HeapError::Transport(_) | HeapError::EmptyBuffer | HeapError::Config(_)
        )
    }
}

/// Result type alias for cookieheap operations
pub type Result<T> = std::result::Result<T, HeapError>;
