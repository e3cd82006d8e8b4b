//! Support Pulse - support desk analytics service.
//!
//! Pulls tickets from Jira Service Management (or a JSON export), keeps
//! them cached and serves service-quality KPIs over HTTP.

use std::sync::Arc;

use tokio::net::TcpListener;

use support_pulse::api::build_router;
use support_pulse::auth::ApiKeyValidator;
use support_pulse::config::{Config, SourceKind};
use support_pulse::source::{FileTicketSource, JiraTicketSource, TicketSource};
use support_pulse::{jobs, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is expected in production
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init();

    tracing::info!("Starting Support Pulse v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        source = ?config.source.kind,
        auth_enabled = %config.auth.enabled,
        "Configuration loaded"
    );

    let source = build_source(&config)?;
    let state = AppState::new(source, config.kpi.clone());

    if config.refresh.on_startup {
        // A dead upstream must not keep the dashboard from starting
        if let Err(e) = state.store.refresh_from(state.source.as_ref(), None).await {
            tracing::warn!(error = %e, "Initial ticket fetch failed; starting with an empty cache");
        }
    }
    jobs::spawn_refresh(state.clone(), &config.refresh);

    let api_key_validator = ApiKeyValidator::new(config.auth.api_keys.clone());
    if config.auth.enabled {
        tracing::info!(
            api_keys = api_key_validator.key_count().await,
            "Authentication enabled"
        );
    } else {
        tracing::warn!("Authentication is DISABLED - enable for production");
    }

    let app = build_router(state, config.auth.enabled, api_key_validator);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_source(config: &Config) -> anyhow::Result<Arc<dyn TicketSource>> {
    match config.source.kind {
        SourceKind::Jira => {
            let source = JiraTicketSource::new(&config.jira)?;
            tracing::info!(
                base_url = %config.jira.base_url,
                project = %config.jira.project_key,
                "Using Jira ticket source"
            );
            Ok(Arc::new(source))
        }
        SourceKind::File => {
            let path = config.source.file_path.as_deref().ok_or_else(|| {
                anyhow::anyhow!("source.file_path is required when source.kind = file")
            })?;
            tracing::info!(path = %path, "Using file ticket source");
            Ok(Arc::new(FileTicketSource::new(path)))
        }
    }
}
