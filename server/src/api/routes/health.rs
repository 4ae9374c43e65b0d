//! Health check endpoint

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::RouteSearch;

#[derive(Clone)]
pub struct HealthApiState {
    pub search: Arc<RouteSearch>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Rows in the current catalog, absent when the store is unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
}

pub fn routes(search: Arc<RouteSearch>) -> Router<()> {
    Router::new()
        .route("/", get(health))
        .with_state(HealthApiState { search })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Route store is unavailable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<HealthApiState>) -> impl IntoResponse {
    match state.search.catalog().await {
        Ok(catalog) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                version: env!("CARGO_PKG_VERSION"),
                routes: Some(catalog.len()),
                generation: Some(catalog.generation),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not load the route catalog");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version: env!("CARGO_PKG_VERSION"),
                    routes: None,
                    generation: None,
                }),
            )
        }
    }
}
