//! Error types for healthwatch
//!
//! Custom error enum that wraps all possible error types in the application.
//! Probe-level faults never travel through this type: they are normalized
//! into the UP/DOWN vocabulary at the probe boundary and carried as a
//! detail message instead.

use thiserror::Error;

/// Main error type for healthwatch operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration field (fatal at startup)
    #[error("config error: {0}")]
    Config(String),

    /// Malformed service URL
    #[error("invalid url: {0}")]
    Url(String),

    /// A probe's backend connection could not be opened (fatal at startup)
    #[error("connect error: {0}")]
    Connect(String),

    /// HTTP transport errors (reqwest)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Notifier delivery errors (logged, never fatal)
    #[error("notifier error: {0}")]
    Notify(String),

    /// Authentication errors (dashboard login, webhook tokens)
    #[error("auth error: {0}")]
    Auth(String),

    /// Invalid or expired JWT
    #[error("invalid jwt: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// I/O errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for healthwatch operations
pub type Result<T> = std::result::Result<T, Error>;
