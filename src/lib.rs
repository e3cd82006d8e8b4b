//! Support Pulse - service-quality KPIs for support desks.
//!
//! Tickets are pulled from a [`source::TicketSource`], cached in a
//! [`store::TicketStore`], narrowed by the [`engine::TicketFilter`] and
//! summarised by the [`engine::KpiAggregator`].

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod source;
pub mod store;

use crate::config::KpiConfig;
use crate::engine::{KpiAggregator, TicketFilter};
use crate::source::TicketSource;
use crate::store::TicketStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where tickets come from.
    pub source: Arc<dyn TicketSource>,
    /// Last fetched ticket set.
    pub store: TicketStore,
    pub filter: TicketFilter,
    pub aggregator: Arc<KpiAggregator>,
    /// Number of weekly periods exposed.
    pub period_count: usize,
}

impl AppState {
    pub fn new(source: Arc<dyn TicketSource>, kpi: KpiConfig) -> Self {
        Self {
            source,
            store: TicketStore::new(),
            filter: TicketFilter::new(),
            period_count: kpi.period_count,
            aggregator: Arc::new(KpiAggregator::new(kpi)),
        }
    }
}
