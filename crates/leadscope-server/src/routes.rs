use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use leadscope_client::run_batch;
use leadscope_core::AppError;
use leadscope_core::models::ScrapeRequest;

use crate::dto::{HealthResponse, ScrapeRequestBody};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/scrape", post(scrape))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Scrape
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/scrape",
    request_body = ScrapeRequestBody,
    responses(
        (status = 200, description = "Batch report: one record per valid URL, a summary, the extraction level and a timestamp"),
        (status = 400, description = "No usable URLs or malformed body", body = crate::dto::ErrorResponse),
        (status = 503, description = "Browser session could not start", body = crate::dto::ErrorResponse),
        (status = 500, description = "Unexpected error", body = crate::dto::ErrorResponse),
    ),
    tag = "scrape"
)]
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    body: Result<axum::Json<ScrapeRequestBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let axum::Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::InvalidRequest("Invalid request body".to_string())
    })?;

    let request = ScrapeRequest::new(body.url_list(), body.level())?;

    let report = run_batch(state.engine, state.config.clone(), &request).await?;

    Ok(axum::Json(report))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "healthy",
        engine: state.engine.as_str(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
