//! In-memory cache of the last fetched ticket set.
//!
//! Readers get a cheap `Arc` snapshot; a refresh swaps the whole set so a
//! request never sees a half-updated collection.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{DateRange, Ticket};
use crate::source::{SourceError, TicketSource};

#[derive(Debug, Default)]
struct Cached {
    tickets: Arc<Vec<Ticket>>,
    fetched_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of the cache.
#[derive(Debug, Clone)]
pub struct TicketSnapshot {
    pub tickets: Arc<Vec<Ticket>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct TicketStore {
    inner: Arc<RwLock<Cached>>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new ticket set, returning the refresh timestamp.
    pub async fn replace(&self, tickets: Vec<Ticket>) -> DateTime<Utc> {
        let now = Utc::now();
        let mut cached = self.inner.write().await;
        cached.tickets = Arc::new(tickets);
        cached.fetched_at = Some(now);
        now
    }

    pub async fn snapshot(&self) -> TicketSnapshot {
        let cached = self.inner.read().await;
        TicketSnapshot {
            tickets: Arc::clone(&cached.tickets),
            fetched_at: cached.fetched_at,
        }
    }

    pub async fn find_by_key(&self, key: &str) -> Option<Ticket> {
        let cached = self.inner.read().await;
        cached.tickets.iter().find(|t| t.key == key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tickets.len()
    }

    /// Fetch from `source` and replace the cache. On failure the previous
    /// set is left untouched.
    pub async fn refresh_from(
        &self,
        source: &dyn TicketSource,
        range: Option<DateRange>,
    ) -> Result<(usize, DateTime<Utc>), SourceError> {
        let tickets = match range {
            Some(range) => source.fetch_by_date_range(range.start, range.end).await?,
            None => source.fetch_all().await?,
        };
        let count = tickets.len();
        let fetched_at = self.replace(tickets).await;

        tracing::info!(source = source.name(), tickets = count, "Ticket cache refreshed");
        Ok((count, fetched_at))
    }
}
