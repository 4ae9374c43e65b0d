//! Route search and CSV export endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::core::constants::NO_RESULTS_NOTICE;
use crate::domain::{ExportOutcome, FilterSelection, RouteRecord, RouteSearch, SearchOutcome};

#[derive(Clone)]
pub struct SearchApiState {
    pub search: Arc<RouteSearch>,
}

pub fn routes(search: Arc<RouteSearch>) -> Router<()> {
    Router::new()
        .route("/search", post(search_routes))
        .route("/export", post(export_routes))
        .with_state(SearchApiState { search })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Shared with the result cache, not copied
    #[schema(value_type = Vec<RouteRecord>)]
    pub rows: Arc<Vec<RouteRecord>>,
    pub count: usize,
    pub no_results: bool,
    /// Whether `/export` would produce a file for this selection
    pub export_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    /// Catalog generation the selection was resolved against
    pub generation: u64,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            count: outcome.len(),
            no_results: outcome.is_empty(),
            export_available: !outcome.is_empty(),
            notice: outcome.notice(),
            generation: outcome.generation,
            rows: outcome.rows,
        }
    }
}

/// Routes matching a filter selection
#[utoipa::path(
    post,
    path = "/api/v1/routes/search",
    tag = "routes",
    request_body = FilterSelection,
    responses(
        (status = 200, description = "Matching routes, possibly none", body = SearchResponse),
        (status = 400, description = "Invalid selection"),
        (status = 503, description = "Route store is unavailable")
    )
)]
pub async fn search_routes(
    State(state): State<SearchApiState>,
    ValidatedJson(selection): ValidatedJson<FilterSelection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let outcome = state.search.search(&selection).await?;
    Ok(Json(outcome.into()))
}

/// Matching routes as a CSV attachment
#[utoipa::path(
    post,
    path = "/api/v1/routes/export",
    tag = "routes",
    request_body = FilterSelection,
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid selection"),
        (status = 404, description = "Selection matches no routes"),
        (status = 503, description = "Route store is unavailable")
    )
)]
pub async fn export_routes(
    State(state): State<SearchApiState>,
    ValidatedJson(selection): ValidatedJson<FilterSelection>,
) -> Result<Response, ApiError> {
    let outcome = state.search.search(&selection).await?;
    match outcome.export()? {
        ExportOutcome::NoResults => Err(ApiError::not_found("NO_RESULTS", NO_RESULTS_NOTICE)),
        ExportOutcome::Csv(export) => {
            tracing::debug!(rows = outcome.len(), "Exporting routes as CSV");
            Ok((
                [
                    (header::CONTENT_TYPE, export.content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", export.file_name),
                    ),
                ],
                export.body,
            )
                .into_response())
        }
    }
}
