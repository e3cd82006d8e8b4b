//! Route definitions for the API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::auth::{require_api_key, ApiKeyValidator};
use crate::AppState;

/// Registers the `X-API-Key` scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::refresh_tickets,
        handlers::list_tickets,
        handlers::get_ticket,
        handlers::get_kpis,
        handlers::calculate_kpis,
        handlers::list_periods,
        handlers::get_active_period,
    ),
    components(schemas(
        crate::api::types::RefreshRequest,
        crate::api::types::RefreshResponse,
        crate::api::types::ListTicketsResponse,
        crate::api::types::KpiReport,
        crate::api::types::CalculateKpisRequest,
        crate::api::types::PeriodsResponse,
        crate::api::types::HealthResponse,
        crate::domain::Ticket,
        crate::domain::TicketStatus,
        crate::domain::Priority,
        crate::domain::User,
        crate::domain::TicketFilters,
        crate::domain::DateRange,
        crate::domain::Kpi,
        crate::domain::KpiCategory,
        crate::domain::KpiStatus,
        crate::domain::KpiUnit,
        crate::domain::KpiThresholds,
        crate::domain::KpiTrend,
        crate::domain::TrendDirection,
        crate::domain::TicketOverview,
        crate::domain::Period,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "tickets", description = "Ticket cache and lookup"),
        (name = "kpis", description = "Service-quality indicators"),
        (name = "periods", description = "Weekly analysis windows"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Support Pulse API",
        version = "0.1.0",
        description = "Support desk analytics - service-quality KPIs from helpdesk tickets",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router. With `auth_enabled`, everything except health
/// and docs requires an API key.
pub fn build_router(
    state: AppState,
    auth_enabled: bool,
    api_key_validator: ApiKeyValidator,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut protected = dashboard_routes();
    if auth_enabled {
        protected = protected.layer(middleware::from_fn_with_state(
            api_key_validator,
            require_api_key,
        ));
    }

    let public_routes = Router::new().route("/v1/health", get(handlers::health_check));

    Router::new()
        .merge(protected)
        .merge(public_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tickets", get(handlers::list_tickets))
        .route("/v1/tickets/refresh", post(handlers::refresh_tickets))
        .route("/v1/tickets/:key", get(handlers::get_ticket))
        .route("/v1/kpis", get(handlers::get_kpis))
        .route("/v1/kpis/calculate", post(handlers::calculate_kpis))
        .route("/v1/periods", get(handlers::list_periods))
        .route("/v1/periods/active", get(handlers::get_active_period))
}
