//! Catalog API endpoints
//!
//! The option lists and bounds a front end needs to render its filter
//! controls, plus an explicit reload.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::domain::{CatalogOptions, RouteSearch};

#[derive(Clone)]
pub struct CatalogApiState {
    pub search: Arc<RouteSearch>,
}

pub fn routes(search: Arc<RouteSearch>) -> Router<()> {
    Router::new()
        .route("/", get(get_catalog))
        .route("/refresh", post(refresh_catalog))
        .with_state(CatalogApiState { search })
}

/// Filter options derived from the current catalog
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Filter options", body = CatalogOptions),
        (status = 503, description = "Route store is unavailable")
    )
)]
pub async fn get_catalog(
    State(state): State<CatalogApiState>,
) -> Result<Json<CatalogOptions>, ApiError> {
    let catalog = state.search.catalog().await?;
    Ok(Json(catalog.options()))
}

/// Reload the catalog from the store and drop cached search results
#[utoipa::path(
    post,
    path = "/api/v1/catalog/refresh",
    tag = "catalog",
    responses(
        (status = 200, description = "Reloaded filter options", body = CatalogOptions),
        (status = 503, description = "Route store is unavailable")
    )
)]
pub async fn refresh_catalog(
    State(state): State<CatalogApiState>,
) -> Result<Json<CatalogOptions>, ApiError> {
    let catalog = state.search.refresh_catalog().await?;
    Ok(Json(catalog.options()))
}
