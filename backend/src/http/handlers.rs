//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the binding
//! layer.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{HealthResponse, PageEventRequest, PageLayout, PageUpdate, Shell};
use super::error::AppError;
use super::state::AppState;
use crate::routes::{self, PageId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_page(page: &str) -> Result<PageId, AppError> {
    page.parse().map_err(AppError::NotFound)
}

/// GET /health
///
/// Service status plus the size of the loaded dataset.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        dataset: state.dashboard.repository().summary(),
    }))
}

/// GET /v1/shell
///
/// Application title and navigation entries.
pub async fn get_shell() -> HandlerResult<Shell> {
    Ok(Json(routes::shell()))
}

/// GET /v1/pages/{page}
///
/// Controls, output slots and default control state of one page.
pub async fn get_page_layout(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> HandlerResult<PageLayout> {
    let page = parse_page(&page)?;
    Ok(Json(routes::page_layout(&state.dashboard, page)?))
}

/// POST /v1/pages/{page}/events
///
/// Apply one control event and return every output it affects.
pub async fn post_page_event(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Json(request): Json<PageEventRequest>,
) -> HandlerResult<PageUpdate> {
    let page = parse_page(&page)?;
    let update = state
        .dashboard
        .handle(page, request.controls, request.event)
        .await?;
    Ok(Json(update))
}
