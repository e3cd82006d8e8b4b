//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{weekly_periods, DateRange, Kpi, Period, Ticket, TicketFilters, TicketOverview};
use crate::error::{PulseError, PulseResult};

// ==================== Filter query ====================

/// Filter criteria shared by the ticket and KPI queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParams<'a> {
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub assignee: Option<&'a str>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub sprint: Option<&'a str>,
    pub period: Option<&'a str>,
}

impl FilterParams<'_> {
    /// Validate and convert into [`TicketFilters`].
    ///
    /// `period` resolves against the weekly periods as of `now` and cannot
    /// be combined with `start`/`end`.
    pub fn to_filters(&self, now: DateTime<Utc>, period_count: usize) -> PulseResult<TicketFilters> {
        let mut filters = TicketFilters::default();

        if let Some(status) = parse_list(self.status)? {
            filters = filters.with_status(status);
        }
        if let Some(priority) = parse_list(self.priority)? {
            filters = filters.with_priority(priority);
        }
        if let Some(assignees) = parse_list::<String>(self.assignee)? {
            filters = filters.with_assignees(assignees);
        }
        if let Some(sprint) = self.sprint.map(str::trim).filter(|s| !s.is_empty()) {
            filters = filters.with_sprint(sprint);
        }

        let range = match (self.start, self.end, self.period) {
            (None, None, None) => None,
            (Some(start), Some(end), None) => {
                Some(DateRange::new(start, end).map_err(PulseError::BadRequest)?)
            }
            (None, None, Some(id)) => {
                let period = weekly_periods(now, period_count)
                    .into_iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| PulseError::BadRequest(format!("Unknown period: {id}")))?;
                Some(period.date_range())
            }
            (_, _, Some(_)) => {
                return Err(PulseError::BadRequest(
                    "period cannot be combined with start/end".to_string(),
                ))
            }
            _ => {
                return Err(PulseError::BadRequest(
                    "start and end must be given together".to_string(),
                ))
            }
        };
        if let Some(range) = range {
            filters = filters.with_date_range(range);
        }

        Ok(filters)
    }
}

/// Parse a comma-separated list. Blank entries are skipped; an all-blank
/// value means "no constraint".
fn parse_list<T>(raw: Option<&str>) -> PulseResult<Option<Vec<T>>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(None);
    };

    let items = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| PulseError::BadRequest(e.to_string())))
        .collect::<PulseResult<Vec<T>>>()?;

    Ok((!items.is_empty()).then_some(items))
}

/// Query parameters for listing tickets.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTicketsQuery {
    /// Comma-separated statuses.
    pub status: Option<String>,
    /// Comma-separated priorities.
    pub priority: Option<String>,
    /// Comma-separated assignee account ids.
    pub assignee: Option<String>,
    /// RFC 3339; requires `end`.
    pub start: Option<DateTime<Utc>>,
    /// RFC 3339; requires `start`.
    pub end: Option<DateTime<Utc>>,
    pub sprint: Option<String>,
    /// Virtual period id, e.g. `week-1`.
    pub period: Option<String>,
    /// Page size (default 50, max 500).
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListTicketsQuery {
    pub fn filter_params(&self) -> FilterParams<'_> {
        FilterParams {
            status: self.status.as_deref(),
            priority: self.priority.as_deref(),
            assignee: self.assignee.as_deref(),
            start: self.start,
            end: self.end,
            sprint: self.sprint.as_deref(),
            period: self.period.as_deref(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(50).clamp(1, 500)
    }
}

/// Query parameters for the KPI report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KpiQuery {
    /// Comma-separated statuses.
    pub status: Option<String>,
    /// Comma-separated priorities.
    pub priority: Option<String>,
    /// Comma-separated assignee account ids.
    pub assignee: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub sprint: Option<String>,
    pub period: Option<String>,
    /// Attach trends against the preceding window of equal length.
    #[serde(default)]
    pub compare: bool,
}

impl KpiQuery {
    pub fn filter_params(&self) -> FilterParams<'_> {
        FilterParams {
            status: self.status.as_deref(),
            priority: self.priority.as_deref(),
            assignee: self.assignee.as_deref(),
            start: self.start,
            end: self.end,
            sprint: self.sprint.as_deref(),
            period: self.period.as_deref(),
        }
    }
}

// ==================== Tickets ====================

/// Optional body for a refresh; both bounds or neither.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl RefreshRequest {
    pub fn date_range(&self) -> PulseResult<Option<DateRange>> {
        match (self.start, self.end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => DateRange::new(start, end)
                .map(Some)
                .map_err(PulseError::BadRequest),
            _ => Err(PulseError::BadRequest(
                "start and end must be given together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub ticket_count: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    /// Matching tickets before pagination.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

// ==================== KPIs ====================

#[derive(Debug, Serialize, ToSchema)]
pub struct KpiReport {
    pub kpis: Vec<Kpi>,
    pub overview: TicketOverview,
    pub ticket_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Stateless calculation over caller-supplied tickets.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculateKpisRequest {
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub filters: Option<TicketFilters>,
}

// ==================== Periods ====================

#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodsResponse {
    pub periods: Vec<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Period>,
    pub recently_closed: Vec<Period>,
}

// ==================== Health ====================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Active ticket source name.
    pub source: String,
    pub cached_tickets: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}
