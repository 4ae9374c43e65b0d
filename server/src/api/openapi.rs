//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{catalog, health, search};
use crate::domain::catalog::BandOption;
use crate::domain::selection::{DurationBand, PriceBand, TimeBand};
use crate::domain::{CatalogBounds, CatalogOptions, FilterSelection, RouteRecord};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Busline API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Bus route filtering and CSV export"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "catalog", description = "Filter options derived from the route catalog"),
        (name = "routes", description = "Route search and export")
    ),
    paths(
        health::health,
        catalog::get_catalog,
        catalog::refresh_catalog,
        search::search_routes,
        search::export_routes,
    ),
    components(schemas(
        health::HealthResponse,
        CatalogOptions,
        CatalogBounds,
        BandOption,
        FilterSelection,
        PriceBand,
        TimeBand,
        DurationBand,
        RouteRecord,
        search::SearchResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Busline API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
