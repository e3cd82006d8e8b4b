//! Domain types for Support Pulse.
//!
//! This module contains the ticket model, filter criteria, reporting
//! periods and the derived KPI records.

mod filter;
mod kpi;
mod metrics;
mod period;
mod ticket;

pub use filter::*;
pub use kpi::*;
pub use metrics::*;
pub use period::*;
pub use ticket::*;
