//! Ticket filter criteria.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Priority, TicketStatus};

/// Inclusive time window on ticket creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, String> {
        if start > end {
            return Err(format!(
                "Invalid date range: start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            ));
        }
        Ok(Self { start, end })
    }

    /// Whether `at` falls inside the window, both ends included.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// The window of equal length ending right before this one starts.
    pub fn preceding(&self) -> Self {
        let end = self.start - chrono::Duration::milliseconds(1);
        Self {
            start: end - self.duration(),
            end,
        }
    }
}

/// Conjunction of optional ticket criteria.
///
/// Absent fields and empty lists impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<TicketStatus>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Vec<Priority>>,

    /// Assignee account ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    /// Exact sprint/period name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint: Option<String>,
}

impl TicketFilters {
    /// True when no criterion would exclude anything.
    pub fn is_empty(&self) -> bool {
        self.status.as_ref().map_or(true, Vec::is_empty)
            && self.priority.as_ref().map_or(true, Vec::is_empty)
            && self.assignee.as_ref().map_or(true, Vec::is_empty)
            && self.date_range.is_none()
            && self.sprint.as_deref().map_or(true, str::is_empty)
    }

    pub fn with_status(mut self, status: Vec<TicketStatus>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Vec<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_assignees(mut self, assignees: Vec<String>) -> Self {
        self.assignee = Some(assignees);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_sprint(mut self, sprint: impl Into<String>) -> Self {
        self.sprint = Some(sprint.into());
        self
    }
}
