//! Wire types for the Jira Cloud REST API v3.
//!
//! Only the fields the mapper reads are modelled; everything else on an
//! issue lands in [`JiraFields::extra`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Page of `GET /rest/api/3/search/jql`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub is_last: Option<bool>,
}

impl SearchResponse {
    /// Token for the following page, if there is one.
    pub fn next_token(&self) -> Option<&str> {
        if self.is_last == Some(true) {
            return None;
        }
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    pub id: String,
    pub key: String,
    pub fields: JiraFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: String,
    /// Plain string or an ADF document.
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(default)]
    pub priority: Option<JiraPriority>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub reporter: Option<JiraUser>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub created: String,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub resolutiondate: Option<String>,
    /// Custom fields and anything else not listed above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraStatus {
    pub name: String,
    #[serde(default)]
    pub status_category: Option<StatusCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCategory {
    /// `new`, `indeterminate` or `done`.
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraPriority {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: String,
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub avatar_urls: Option<HashMap<String, String>>,
}

/// Entry of the agile sprint field (`customfield_10020`).
#[derive(Debug, Clone, Deserialize)]
pub struct JiraSprint {
    pub name: String,
    #[serde(default)]
    pub state: String,
}

/// Jira Service Management SLA field value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaField {
    #[serde(default)]
    pub completed_cycles: Vec<SlaCycle>,
    #[serde(default)]
    pub ongoing_cycle: Option<SlaCycle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaCycle {
    #[serde(default)]
    pub breached: bool,
    #[serde(default)]
    pub elapsed_time: Option<SlaDuration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlaDuration {
    pub millis: i64,
}

impl SlaField {
    /// Elapsed minutes of the first completed cycle.
    pub fn first_completed_minutes(&self) -> Option<f64> {
        self.completed_cycles
            .first()
            .and_then(|c| c.elapsed_time.as_ref())
            .map(|d| d.millis as f64 / 60_000.0)
    }

    pub fn is_breached(&self) -> bool {
        self.completed_cycles.iter().any(|c| c.breached)
            || self.ongoing_cycle.as_ref().is_some_and(|c| c.breached)
    }
}
