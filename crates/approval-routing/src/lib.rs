//! Expense approval routing: a deterministic policy engine plus the service plumbing around it.

pub mod config;
pub mod error;
pub mod policy;
pub mod telemetry;
