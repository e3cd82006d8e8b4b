//! Configuration module for Support Pulse.
//!
//! Loads configuration from YAML files and environment variables.

use chrono::NaiveDate;
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::ConfiguredApiKey;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub kpi: KpiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Which ticket source backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Jira,
    File,
}

/// Ticket source selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// JSON ticket export, used when `kind = file`.
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Jira Service Management connection and field mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// e.g. `https://acme.atlassian.net`
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
    /// Tickets created before this day are ignored by full fetches.
    pub since: NaiveDate,
    /// UTC offset of the Jira account's profile timezone; JQL dates are
    /// read in that zone.
    pub utc_offset_minutes: i32,
    pub page_size: u32,
    /// Hard stop for token pagination.
    pub max_pages: u32,
    pub timeout_secs: u64,
    /// SLA field tracking time to first response.
    pub first_response_sla_field: Option<String>,
    /// SLA field tracking time to resolution.
    pub resolution_sla_field: Option<String>,
    /// Customer satisfaction field (1-5 rating).
    pub satisfaction_field: Option<String>,
    /// Field flagging first-contact resolution.
    pub first_contact_field: Option<String>,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            project_key: "SUP".to_string(),
            since: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            utc_offset_minutes: 0,
            page_size: 100,
            max_pages: 200,
            timeout_secs: 30,
            first_response_sla_field: None,
            resolution_sla_field: None,
            satisfaction_field: None,
            first_contact_field: None,
        }
    }
}

impl JiraConfig {
    /// Whether enough is configured to talk to Jira at all.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.email.is_empty() && !self.api_token.is_empty()
    }
}

/// KPI calculation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// A first response at or under this many minutes counts as fast.
    pub fast_reply_minutes: f64,
    /// Number of weekly periods exposed to the dashboard.
    pub period_count: usize,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            fast_reply_minutes: 30.0,
            period_count: 4,
        }
    }
}

/// Ticket cache refresh behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub on_startup: bool,
    /// Background refresh interval; 0 disables it.
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            on_startup: true,
            interval_secs: 300,
        }
    }
}

/// API authentication.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub api_keys: Vec<ConfiguredApiKey>,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (PULSE__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
