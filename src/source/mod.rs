//! Ticket sources.
//!
//! The engine never fetches anything itself; a [`TicketSource`] hands it
//! a ticket collection. Two implementations ship:
//! - [`JiraTicketSource`]: Jira Service Management over REST
//! - [`FileTicketSource`]: a JSON export on disk

mod file;
pub mod jira;

pub use file::FileTicketSource;
pub use jira::{JiraClient, JiraTicketSource};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Ticket;

/// Failure while fetching or mapping tickets.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON from source: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot map ticket {key}: {reason}")]
    Mapping { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ticket source not configured: {0}")]
    NotConfigured(String),
}

impl SourceError {
    /// Short, non-sensitive label for API error details.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Http(_) => "transport",
            SourceError::Status { .. } => "upstream_status",
            SourceError::Decode(_) => "decode",
            SourceError::Mapping { .. } => "mapping",
            SourceError::Io(_) => "io",
            SourceError::NotConfigured(_) => "not_configured",
        }
    }
}

/// Anything that can supply tickets to the engine.
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// Every ticket in scope for the dashboard.
    async fn fetch_all(&self) -> Result<Vec<Ticket>, SourceError>;

    /// Tickets created within `[start, end]`.
    async fn fetch_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, SourceError>;

    /// A single ticket by its human-readable key.
    async fn fetch_by_key(&self, key: &str) -> Result<Option<Ticket>, SourceError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_hides_details() {
        let err = SourceError::Status {
            status: 401,
            body: "token=secret".to_string(),
        };
        assert_eq!(err.kind(), "upstream_status");
        assert!(err.to_string().contains("401"));
    }
}
