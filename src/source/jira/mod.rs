//! Jira Service Management ticket source.

mod client;
pub mod mapper;
pub mod types;

pub use client::JiraClient;
pub use mapper::FieldMapping;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};

use crate::config::JiraConfig;
use crate::domain::Ticket;
use crate::source::{SourceError, TicketSource};

/// Pages through a project's issues and maps them to tickets.
pub struct JiraTicketSource {
    client: JiraClient,
    project_key: String,
    since: NaiveDate,
    zone: FixedOffset,
    page_size: u32,
    max_pages: u32,
    mapping: FieldMapping,
}

impl JiraTicketSource {
    pub fn new(config: &JiraConfig) -> Result<Self, SourceError> {
        let zone = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                SourceError::NotConfigured(format!(
                    "jira.utc_offset_minutes out of range: {}",
                    config.utc_offset_minutes
                ))
            })?;

        Ok(Self {
            client: JiraClient::new(config)?,
            project_key: config.project_key.clone(),
            since: config.since,
            zone,
            page_size: config.page_size.clamp(1, 100),
            max_pages: config.max_pages.max(1),
            mapping: FieldMapping::from(config),
        })
    }

    /// JQL for every ticket created on or after `since`.
    pub fn all_tickets_jql(&self) -> String {
        format!(
            "project = {} AND created >= \"{}\" ORDER BY created DESC",
            self.project_key,
            self.since.format("%Y-%m-%d")
        )
    }

    /// JQL for tickets created within `[start, end]`.
    ///
    /// JQL dates have minute precision in the account's zone: `start` is
    /// truncated and `end` rounded up so the window never shrinks.
    pub fn date_range_jql(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        let start = start.with_timezone(&self.zone);
        let end = ceil_to_minute(end.with_timezone(&self.zone));
        format!(
            "project = {} AND created >= \"{}\" AND created <= \"{}\" ORDER BY created DESC",
            self.project_key,
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )
    }

    async fn search(&self, jql: &str) -> Result<Vec<Ticket>, SourceError> {
        let mut tickets = Vec::new();
        let mut token: Option<String> = None;
        let mut page = 0;

        loop {
            page += 1;
            let response = self
                .client
                .search_page(jql, self.page_size, token.as_deref())
                .await?;
            let next = response.next_token().map(str::to_string);

            tracing::debug!(page, issues = response.issues.len(), "Fetched Jira page");

            for issue in response.issues {
                tickets.push(mapper::to_ticket(issue, &self.mapping)?);
            }

            match next {
                Some(next) if page < self.max_pages => token = Some(next),
                Some(_) => {
                    tracing::warn!(
                        max_pages = self.max_pages,
                        fetched = tickets.len(),
                        "Jira pagination capped; remaining pages skipped"
                    );
                    break;
                }
                None => break,
            }
        }

        tracing::info!(pages = page, tickets = tickets.len(), "Jira search complete");
        Ok(tickets)
    }
}

fn ceil_to_minute(at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let floor = at
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at);
    if floor < at {
        floor + Duration::minutes(1)
    } else {
        floor
    }
}

#[async_trait]
impl TicketSource for JiraTicketSource {
    async fn fetch_all(&self) -> Result<Vec<Ticket>, SourceError> {
        self.search(&self.all_tickets_jql()).await
    }

    async fn fetch_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, SourceError> {
        self.search(&self.date_range_jql(start, end)).await
    }

    async fn fetch_by_key(&self, key: &str) -> Result<Option<Ticket>, SourceError> {
        match self.client.get_issue(key).await? {
            Some(issue) => mapper::to_ticket(issue, &self.mapping).map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "jira"
    }
}
