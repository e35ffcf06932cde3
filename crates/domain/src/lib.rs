//! Domain types and the scoring engine for the LentoFlow backend.

pub mod auth;
pub mod engine;
pub mod errors;
pub mod messages;
pub mod recommend;
pub mod stats;
pub mod tasks;
pub mod today;

use serde::Serialize;

pub use auth::*;
pub use engine::*;
pub use errors::*;
pub use messages::*;
pub use recommend::*;
pub use stats::*;
pub use tasks::*;
pub use today::*;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Ready check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub database: String,
}
