//! Conversion from Jira issues to domain tickets.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::types::{JiraFields, JiraIssue, JiraSprint, JiraUser, SlaField};
use crate::config::JiraConfig;
use crate::domain::{Priority, Ticket, TicketStatus, User};
use crate::source::SourceError;

const SPRINT_FIELD: &str = "customfield_10020";

/// Which Jira custom fields carry service-desk data.
#[derive(Debug, Clone, Default)]
pub struct FieldMapping {
    pub first_response_sla: Option<String>,
    pub resolution_sla: Option<String>,
    pub satisfaction: Option<String>,
    pub first_contact: Option<String>,
}

impl From<&JiraConfig> for FieldMapping {
    fn from(config: &JiraConfig) -> Self {
        Self {
            first_response_sla: config.first_response_sla_field.clone(),
            resolution_sla: config.resolution_sla_field.clone(),
            satisfaction: config.satisfaction_field.clone(),
            first_contact: config.first_contact_field.clone(),
        }
    }
}

/// Turn one issue into a ticket.
pub fn to_ticket(issue: JiraIssue, mapping: &FieldMapping) -> Result<Ticket, SourceError> {
    let JiraIssue { id, key, fields } = issue;

    let created_at = parse_timestamp(&fields.created).ok_or_else(|| SourceError::Mapping {
        key: key.clone(),
        reason: format!("unparseable created timestamp '{}'", fields.created),
    })?;
    let resolved_at = match fields.resolutiondate.as_deref() {
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| SourceError::Mapping {
            key: key.clone(),
            reason: format!("unparseable resolution date '{raw}'"),
        })?),
        None => None,
    };
    let updated_at = fields
        .updated
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(created_at);

    let first_response_sla = sla_field(&fields, mapping.first_response_sla.as_deref());
    let resolution_sla = sla_field(&fields, mapping.resolution_sla.as_deref());
    let breached = first_response_sla.as_ref().is_some_and(SlaField::is_breached)
        || resolution_sla.as_ref().is_some_and(SlaField::is_breached);
    let rating = mapping
        .satisfaction
        .as_deref()
        .and_then(|f| fields.extra.get(f))
        .and_then(satisfaction_rating)
        .unwrap_or(0);
    let first_contact = mapping
        .first_contact
        .as_deref()
        .and_then(|f| fields.extra.get(f))
        .is_some_and(is_affirmative);
    let escalated = fields
        .labels
        .iter()
        .any(|l| l.to_lowercase().contains("escalated"));

    let reporter = fields.reporter.as_ref().map(to_user).unwrap_or_else(User::unknown);
    let mut ticket = Ticket::new(id, key, fields.summary.clone(), reporter)
        .with_status(map_status(&fields))
        .with_priority(map_priority(fields.priority.as_ref().map(|p| p.name.as_str())))
        .with_labels(fields.labels.clone())
        .with_sla(rating, breached)
        .escalated_times(u32::from(escalated))
        .with_first_contact_resolution(first_contact);

    if let Some(assignee) = fields.assignee.as_ref() {
        ticket = ticket.with_assignee(to_user(assignee));
    }
    if let Some(sprint) = fields.extra.get(SPRINT_FIELD).and_then(sprint_name) {
        ticket = ticket.with_sprint(sprint);
    }
    if let Some(minutes) = first_response_sla.as_ref().and_then(SlaField::first_completed_minutes)
    {
        ticket = ticket.with_first_response(minutes);
    }

    ticket.description = fields.description.as_ref().map(description_text).unwrap_or_default();
    ticket.created_at = created_at;
    ticket.updated_at = updated_at;
    ticket.resolved_at = resolved_at;
    ticket.resolution_time = resolved_at.map(|at| (at - created_at).num_minutes() as f64);
    ticket.custom_fields = fields
        .extra
        .iter()
        .filter(|(k, _)| k.starts_with("customfield_"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(ticket)
}

fn map_status(fields: &JiraFields) -> TicketStatus {
    let Some(status) = fields.status.as_ref() else {
        return TicketStatus::Open;
    };

    let name = status.name.to_lowercase();
    if name == "closed" {
        return TicketStatus::Closed;
    }
    if name.contains("pending") || name.contains("waiting") {
        return TicketStatus::Pending;
    }

    match status.status_category.as_ref().map(|c| c.key.as_str()) {
        Some("indeterminate") => TicketStatus::InProgress,
        Some("done") => TicketStatus::Resolved,
        _ => TicketStatus::Open,
    }
}

fn map_priority(name: Option<&str>) -> Priority {
    name.and_then(|n| n.parse().ok()).unwrap_or(Priority::Medium)
}

fn to_user(user: &JiraUser) -> User {
    User {
        id: user.account_id.clone(),
        name: user.display_name.clone(),
        email: user.email_address.clone().unwrap_or_default(),
        display_name: user.display_name.clone(),
        avatar_url: user
            .avatar_urls
            .as_ref()
            .and_then(|urls| urls.get("48x48").cloned()),
    }
}

/// RFC 3339, or Jira's `2025-01-15T10:30:00.000+0000`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn sla_field(fields: &JiraFields, name: Option<&str>) -> Option<SlaField> {
    let value = fields.extra.get(name?)?;
    serde_json::from_value(value.clone()).ok()
}

fn satisfaction_rating(value: &Value) -> Option<u8> {
    let rating = match value {
        Value::Object(obj) => obj.get("rating")?.as_u64()?,
        other => other.as_u64()?,
    };
    Some(rating.min(5) as u8)
}

fn is_affirmative(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.to_lowercase().as_str(), "yes" | "true"),
        Value::Object(obj) => obj.get("value").is_some_and(is_affirmative),
        _ => false,
    }
}

/// Active sprint name, else the last listed.
fn sprint_name(value: &Value) -> Option<String> {
    let sprints: Vec<JiraSprint> = serde_json::from_value(value.clone()).ok()?;
    sprints
        .iter()
        .find(|s| s.state == "active")
        .or_else(|| sprints.last())
        .map(|s| s.name.clone())
}

fn description_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => adf_text(value).trim().to_string(),
        _ => String::new(),
    }
}

/// Flatten an Atlassian Document Format tree into plain text.
fn adf_text(node: &Value) -> String {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        return text.to_string();
    }
    let Some(children) = node.get("content").and_then(Value::as_array) else {
        return String::new();
    };

    let kind = node.get("type").and_then(Value::as_str).unwrap_or_default();
    children
        .iter()
        .map(|child| {
            let text = adf_text(child);
            if text.is_empty() {
                return text;
            }
            match kind {
                "paragraph" | "heading" => format!("{text}\n"),
                "listItem" => format!("• {text}\n"),
                "codeBlock" => format!("```\n{text}\n```\n"),
                _ => text,
            }
        })
        .collect()
}
