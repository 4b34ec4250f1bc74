//! # Healthwatch Dashboard
//!
//! Web dashboard for the monitor: serves the status frontend, exposes a
//! JWT-protected services API, and ingests the monitor's webhook
//! notifications to keep per-service state current.

pub mod auth;
pub mod envelope;
pub mod handlers;
pub mod server;
pub mod state;

pub use server::router;
pub use state::{DashboardState, ServiceStatus};
