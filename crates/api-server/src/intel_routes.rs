//! Reasoning and Headline Proxy Routes
//!
//! Thin passthroughs to the external reasoning and headline services. No
//! scoring happens here.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::analyze_routes::parse_target;
use crate::{method_not_allowed, AppError, AppState};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReasoningResponse {
    pub analysis: String,
}

pub fn intel_routes() -> Router<AppState> {
    Router::new()
        .route("/reasoning", post(reasoning).fallback(method_not_allowed))
        .route("/headlines", get(headlines).fallback(method_not_allowed))
}

#[utoipa::path(
    post,
    path = "/reasoning",
    request_body = crate::analyze_routes::TargetRequest,
    responses(
        (status = 200, description = "Short narrative produced by the reasoning service", body = ReasoningResponse),
        (status = 400, description = "No country supplied"),
        (status = 500, description = "Reasoning service unreachable"),
        (status = 502, description = "Reasoning service refused or returned an unusable answer")
    ),
    tag = "Intel"
)]
pub async fn reasoning(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReasoningResponse>, AppError> {
    let country = parse_target(&body)?;
    tracing::info!(country = %country, "reasoning requested");

    let analysis = state
        .intel
        .reasoning
        .analyze(&country)
        .await
        .map_err(AppError::Reasoning)?;

    Ok(Json(ReasoningResponse { analysis }))
}

#[utoipa::path(
    get,
    path = "/headlines",
    responses(
        (status = 200, description = "Upstream top headlines, verbatim"),
        (status = 500, description = "Headline service failure")
    ),
    tag = "Intel"
)]
pub async fn headlines(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("headlines requested");
    let body = state
        .intel
        .headlines
        .top_headlines()
        .await
        .map_err(AppError::Headlines)?;

    Ok(Json(body))
}
