//! # Healthwatch Monitor
//!
//! The probe-scheduling engine: CLI, runner, per-probe tick loops, and the
//! transition detector that turns ping results into notifications.

pub mod cli;
pub mod dispatch;
pub mod runner;
pub mod waiter;

pub use runner::{Runner, DEFAULT_CHECK_INTERVAL};
pub use waiter::{Waiter, WaiterHandle};
