//! KPI engine for Support Pulse.
//!
//! This module contains the pure, synchronous computations:
//! - Ticket Filter: narrows a ticket collection by AND-combined criteria
//! - KPI Aggregator: derives the seven service-quality indicators
//! - Trend annotation: compares a KPI set against a prior period

mod aggregator;
mod filter;
mod trend;

pub use aggregator::*;
pub use filter::*;
pub use trend::*;
