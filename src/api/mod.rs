//! HTTP API layer for Support Pulse.
//!
//! REST endpoints for the ticket cache, KPI reports and analysis periods.

pub mod handlers;
mod routes;
pub mod types;

pub use routes::{build_router, ApiDoc};
