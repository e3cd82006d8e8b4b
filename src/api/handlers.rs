//! HTTP request handlers.

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::Utc;

use crate::api::types::*;
use crate::auth::ApiKeyInfo;
use crate::domain::{active_period, recent_closed, weekly_periods, Period, Ticket, TicketOverview};
use crate::engine::annotate_trends;
use crate::error::{PulseError, PulseResult};
use crate::AppState;

/// Health check endpoint.
///
/// GET /v1/health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.source.name().to_string(),
        cached_tickets: snapshot.tickets.len(),
        last_refresh: snapshot.fetched_at,
        timestamp: Utc::now(),
    })
}

/// Re-fetch tickets from the source and replace the cache.
///
/// POST /v1/tickets/refresh
#[utoipa::path(
    post,
    path = "/v1/tickets/refresh",
    request_body(content = RefreshRequest, description = "Optional creation window"),
    responses(
        (status = 200, description = "Cache refreshed", body = RefreshResponse),
        (status = 400, description = "Invalid date range"),
        (status = 502, description = "Ticket source failed")
    ),
    tag = "tickets"
)]
pub async fn refresh_tickets(
    State(state): State<AppState>,
    client: Option<Extension<ApiKeyInfo>>,
    body: Bytes,
) -> PulseResult<Json<RefreshResponse>> {
    let request: RefreshRequest = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let range = request.date_range()?;

    tracing::info!(
        client_id = client.as_ref().map(|Extension(c)| c.client_id.as_str()),
        ranged = range.is_some(),
        "Refreshing tickets"
    );

    let (ticket_count, fetched_at) = state
        .store
        .refresh_from(state.source.as_ref(), range)
        .await?;

    Ok(Json(RefreshResponse {
        ticket_count,
        fetched_at,
    }))
}

/// List cached tickets matching the filter.
///
/// GET /v1/tickets
#[utoipa::path(
    get,
    path = "/v1/tickets",
    params(ListTicketsQuery),
    responses(
        (status = 200, description = "Matching tickets", body = ListTicketsResponse),
        (status = 400, description = "Invalid filter")
    ),
    tag = "tickets"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    query: Result<Query<ListTicketsQuery>, QueryRejection>,
) -> PulseResult<Json<ListTicketsResponse>> {
    let Query(query) = query?;
    let filters = query
        .filter_params()
        .to_filters(Utc::now(), state.period_count)?;
    let snapshot = state.store.snapshot().await;
    let matching = state.filter.apply(&snapshot.tickets, &filters);

    let limit = query.limit();
    let offset = query.offset.unwrap_or(0);
    let total = matching.len();
    let tickets = matching.into_iter().skip(offset).take(limit).collect();

    Ok(Json(ListTicketsResponse {
        tickets,
        total,
        limit,
        offset,
    }))
}

/// Look up a ticket by key, falling back to the source on a cache miss.
///
/// GET /v1/tickets/{key}
#[utoipa::path(
    get,
    path = "/v1/tickets/{key}",
    params(
        ("key" = String, Path, description = "Ticket key, e.g. SUP-123")
    ),
    responses(
        (status = 200, description = "Ticket", body = Ticket),
        (status = 400, description = "Malformed ticket key"),
        (status = 404, description = "Ticket not found"),
        (status = 502, description = "Ticket source failed")
    ),
    tag = "tickets"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> PulseResult<Json<Ticket>> {
    let Path(key) = key?;
    if !Ticket::is_valid_key(&key) {
        return Err(PulseError::BadRequest(format!(
            "Invalid ticket key: {key}. Expected e.g. SUP-123"
        )));
    }

    if let Some(ticket) = state.store.find_by_key(&key).await {
        return Ok(Json(ticket));
    }

    tracing::debug!(key = %key, "Cache miss, asking ticket source");
    state
        .source
        .fetch_by_key(&key)
        .await?
        .map(Json)
        .ok_or_else(|| PulseError::NotFound(format!("Ticket {key} not found")))
}

/// KPI report over the cached tickets.
///
/// GET /v1/kpis
#[utoipa::path(
    get,
    path = "/v1/kpis",
    params(KpiQuery),
    responses(
        (status = 200, description = "KPI report", body = KpiReport),
        (status = 400, description = "Invalid filter")
    ),
    tag = "kpis"
)]
pub async fn get_kpis(
    State(state): State<AppState>,
    query: Result<Query<KpiQuery>, QueryRejection>,
) -> PulseResult<Json<KpiReport>> {
    let Query(query) = query?;
    let now = Utc::now();
    let filters = query.filter_params().to_filters(now, state.period_count)?;
    let snapshot = state.store.snapshot().await;

    let tickets = state.filter.apply(&snapshot.tickets, &filters);
    let mut kpis = state.aggregator.aggregate_at(&tickets, now);

    if query.compare {
        if let Some(range) = filters.date_range {
            let previous_filters = filters.clone().with_date_range(range.preceding());
            let previous_tickets = state.filter.apply(&snapshot.tickets, &previous_filters);
            let previous = state.aggregator.aggregate_at(&previous_tickets, now);
            kpis = annotate_trends(kpis, &previous);
        }
    }

    tracing::info!(
        tickets = tickets.len(),
        compare = query.compare,
        "KPI report generated"
    );

    Ok(Json(KpiReport {
        kpis,
        overview: TicketOverview::from_tickets(&tickets),
        ticket_count: tickets.len(),
        generated_at: now,
    }))
}

/// Compute KPIs over tickets supplied in the request.
///
/// POST /v1/kpis/calculate
#[utoipa::path(
    post,
    path = "/v1/kpis/calculate",
    request_body = CalculateKpisRequest,
    responses(
        (status = 200, description = "KPI report", body = KpiReport),
        (status = 400, description = "Invalid request")
    ),
    tag = "kpis"
)]
pub async fn calculate_kpis(
    State(state): State<AppState>,
    request: Result<Json<CalculateKpisRequest>, JsonRejection>,
) -> PulseResult<Json<KpiReport>> {
    let Json(request) = request?;
    let now = Utc::now();
    let tickets = match request.filters {
        Some(filters) => state.filter.apply(&request.tickets, &filters),
        None => request.tickets,
    };

    Ok(Json(KpiReport {
        kpis: state.aggregator.aggregate_at(&tickets, now),
        overview: TicketOverview::from_tickets(&tickets),
        ticket_count: tickets.len(),
        generated_at: now,
    }))
}

/// Weekly analysis periods.
///
/// GET /v1/periods
#[utoipa::path(
    get,
    path = "/v1/periods",
    responses(
        (status = 200, description = "Weekly periods, newest first", body = PeriodsResponse)
    ),
    tag = "periods"
)]
pub async fn list_periods(State(state): State<AppState>) -> Json<PeriodsResponse> {
    let periods = weekly_periods(Utc::now(), state.period_count);
    let active = active_period(&periods).cloned();
    let recently_closed = recent_closed(&periods, state.period_count)
        .into_iter()
        .cloned()
        .collect();

    Json(PeriodsResponse {
        periods,
        active,
        recently_closed,
    })
}

/// The period containing now.
///
/// GET /v1/periods/active
#[utoipa::path(
    get,
    path = "/v1/periods/active",
    responses(
        (status = 200, description = "Active period", body = Period),
        (status = 404, description = "No active period")
    ),
    tag = "periods"
)]
pub async fn get_active_period(State(state): State<AppState>) -> PulseResult<Json<Period>> {
    let periods = weekly_periods(Utc::now(), state.period_count);
    active_period(&periods)
        .cloned()
        .map(Json)
        .ok_or_else(|| PulseError::NotFound("No active period".to_string()))
}
