//! # Healthwatch Common Library
//!
//! Shared utilities and infrastructure code used by all healthwatch services.
//!
//! This crate provides:
//! - Custom error types
//! - Structured logging setup
//! - Timeout-bounded HTTP client facade (used by probes and notifiers)
//! - Downtime formatting and timezone rendering helpers
//! - Lenient URL authority parsing (multi-host broker URLs)
//! - SHA-256 digest and JWT token helpers for the dashboard

// Module declarations
pub mod auth;
pub mod error;
pub mod httpx;
pub mod logging;
pub mod timeutil;
pub mod urlutil;

// Re-export commonly used types
pub use auth::{Claims, generate_token, sha256_hex, validate_token};
pub use error::{Error, Result};
pub use httpx::HttpClient;
pub use logging::init_tracing;
