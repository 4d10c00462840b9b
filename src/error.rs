//! Error types for the postsync crate

use thiserror::Error;

/// Result type for postsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for postsync operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Change-event projection error
    #[error("Projection error: {0}")]
    Projection(String),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
