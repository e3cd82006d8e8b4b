//! Ticket-related domain types.
//!
//! Represents one support case as delivered by a ticket source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly created, nobody working on it yet.
    Open,
    /// An agent is working on it.
    InProgress,
    /// Waiting on the customer or a third party.
    Pending,
    /// A solution was delivered.
    Resolved,
    /// Resolved and closed for good.
    Closed,
}

impl TicketStatus {
    /// Resolved or closed.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }

    /// Open or in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::InProgress => write!(f, "in_progress"),
            TicketStatus::Pending => write!(f, "pending"),
            TicketStatus::Resolved => write!(f, "resolved"),
            TicketStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "in_progress" | "in-progress" => Ok(TicketStatus::InProgress),
            "pending" => Ok(TicketStatus::Pending),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            _ => Err(format!(
                "Invalid ticket status: {}. Use open, in_progress, pending, resolved or closed",
                s
            )),
        }
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Lowest,
    Low,
    Medium,
    High,
    Highest,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Lowest => write!(f, "lowest"),
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Highest => write!(f, "highest"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lowest" => Ok(Priority::Lowest),
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "highest" => Ok(Priority::Highest),
            _ => Err(format!(
                "Invalid priority: {}. Use lowest, low, medium, high or highest",
                s
            )),
        }
    }
}

/// A person on either side of a ticket (agent, customer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Provider account identifier.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    /// Create a user whose name doubles as display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            display_name: name.clone(),
            name,
            email: String::new(),
            avatar_url: None,
        }
    }

    /// Placeholder for tickets whose reporter was deleted upstream.
    pub fn unknown() -> Self {
        Self::new("unknown", "Unknown")
    }
}

/// A support ticket.
///
/// Timing fields are optional on purpose: a ticket without a recorded
/// first response is excluded from response-time metrics, it never
/// counts as a zero-minute response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ticket {
    /// Opaque provider identifier.
    pub id: String,

    /// Human-readable key, e.g. `SUP-123`.
    pub key: String,

    pub summary: String,

    /// Plain-text description.
    #[serde(default)]
    pub description: String,

    pub status: TicketStatus,

    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,

    pub reporter: User,

    #[serde(default)]
    pub labels: Vec<String>,

    /// Sprint or period name, when the provider tracks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Minutes from creation to first reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_response_time: Option<f64>,

    /// Minutes from creation to resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_time: Option<f64>,

    /// Star rating, 0-5.
    #[serde(default)]
    pub sla_compliance: u8,

    #[serde(default)]
    pub sla_breached: bool,

    #[serde(default)]
    pub escalated: bool,

    /// Always 0 when `escalated` is false.
    #[serde(default)]
    pub escalation_count: u32,

    /// Only meaningful for resolved or closed tickets.
    #[serde(default)]
    pub resolved_on_first_contact: bool,

    /// Provider-specific fields, opaque to the engine.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
}

impl Ticket {
    /// Create a ticket with required fields; everything else gets defaults.
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        summary: impl Into<String>,
        reporter: User,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            key: key.into(),
            summary: summary.into(),
            description: String::new(),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            assignee: None,
            reporter,
            labels: Vec::new(),
            sprint: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            first_response_time: None,
            resolution_time: None,
            sla_compliance: 0,
            sla_breached: false,
            escalated: false,
            escalation_count: 0,
            resolved_on_first_contact: false,
            custom_fields: serde_json::Map::new(),
        }
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: User) -> Self {
        self.assignee = Some(assignee);
        self
    }

    pub fn with_sprint(mut self, sprint: impl Into<String>) -> Self {
        self.sprint = Some(sprint.into());
        self
    }

    /// Set creation time; `updated_at` is moved along if it would precede it.
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        if self.updated_at < at {
            self.updated_at = at;
        }
        self
    }

    /// Mark resolved at the given time, deriving the resolution time.
    pub fn resolved(mut self, at: DateTime<Utc>) -> Self {
        if !self.status.is_resolved() {
            self.status = TicketStatus::Resolved;
        }
        self.resolved_at = Some(at);
        self.resolution_time = Some((at - self.created_at).num_minutes() as f64);
        self
    }

    pub fn with_first_response(mut self, minutes: f64) -> Self {
        self.first_response_time = Some(minutes);
        self
    }

    pub fn with_resolution_time(mut self, minutes: f64) -> Self {
        self.resolution_time = Some(minutes);
        self
    }

    /// Set the SLA star rating, clamped to 0-5.
    pub fn with_sla(mut self, rating: u8, breached: bool) -> Self {
        self.sla_compliance = rating.min(5);
        self.sla_breached = breached;
        self
    }

    /// Record `count` escalations; zero clears the escalated flag.
    pub fn escalated_times(mut self, count: u32) -> Self {
        self.escalated = count > 0;
        self.escalation_count = count;
        self
    }

    pub fn with_first_contact_resolution(mut self, value: bool) -> Self {
        self.resolved_on_first_contact = value;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Assignee account id, if assigned.
    pub fn assignee_id(&self) -> Option<&str> {
        self.assignee.as_ref().map(|u| u.id.as_str())
    }

    /// Whether `key` has the `PROJECT-123` shape: an uppercase letter,
    /// then uppercase letters, digits or `_`, a dash and a number.
    pub fn is_valid_key(key: &str) -> bool {
        let Some((project, number)) = key.split_once('-') else {
            return false;
        };

        let mut project_chars = project.chars();
        project_chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && project_chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            && !number.is_empty()
            && number.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: TicketStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TicketStatus::InProgress);
    }

    #[test]
    fn test_status_and_priority_parsing() {
        assert_eq!("Resolved".parse::<TicketStatus>(), Ok(TicketStatus::Resolved));
        assert_eq!("in-progress".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert!("done".parse::<TicketStatus>().is_err());

        assert_eq!(" HIGHEST ".parse::<Priority>(), Ok(Priority::Highest));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_ticket_key_shape() {
        for key in ["SUP-1", "HELP_DESK-420", "A1-7"] {
            assert!(Ticket::is_valid_key(key), "{key}");
        }
        for key in [
            "",
            "SUP",
            "sup-1",
            "SUP-",
            "SUP-1a",
            "-1",
            "SUP-1-2",
            "../../../api/2/myself",
            "SUP-1/../../myself",
            "SUP-1?jql=x",
        ] {
            assert!(!Ticket::is_valid_key(key), "{key}");
        }
    }

    #[test]
    fn test_new_ticket_defaults() {
        let ticket = Ticket::new("10001", "SUP-1", "Printer on fire", User::new("u1", "Ana"));

        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::Medium);
        assert!(ticket.first_response_time.is_none());
        assert!(ticket.resolution_time.is_none());
        assert!(!ticket.escalated);
        assert_eq!(ticket.escalation_count, 0);
        assert!(ticket.assignee_id().is_none());
    }

    #[test]
    fn test_resolved_derives_resolution_time() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let ticket = Ticket::new("1", "SUP-1", "s", User::unknown())
            .created(created)
            .resolved(created + chrono::Duration::minutes(95));

        assert_eq!(ticket.status, TicketStatus::Resolved);
        assert_eq!(ticket.resolution_time, Some(95.0));
        assert!(ticket.status.is_resolved());
    }

    #[test]
    fn test_escalation_invariant() {
        let ticket = Ticket::new("1", "SUP-1", "s", User::unknown()).escalated_times(3);
        assert!(ticket.escalated);
        assert_eq!(ticket.escalation_count, 3);

        let ticket = ticket.escalated_times(0);
        assert!(!ticket.escalated);
        assert_eq!(ticket.escalation_count, 0);
    }

    #[test]
    fn test_deserialize_minimal_ticket() {
        let ticket: Ticket = serde_json::from_value(serde_json::json!({
            "id": "1",
            "key": "SUP-9",
            "summary": "Cannot log in",
            "status": "pending",
            "priority": "high",
            "reporter": { "id": "c1", "name": "Cliente", "display_name": "Cliente" },
            "created_at": "2025-02-01T10:00:00Z",
            "updated_at": "2025-02-01T11:00:00Z",
            "first_response_time": 0.0
        }))
        .unwrap();

        assert_eq!(ticket.status, TicketStatus::Pending);
        assert_eq!(ticket.first_response_time, Some(0.0));
        assert!(ticket.custom_fields.is_empty());
        assert_eq!(ticket.sla_compliance, 0);
    }
}
