//! Posture Assessment Routes
//!
//! `POST /analyze` runs the full scoring pipeline for one country.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use posture_core::{PostureError, RequestStage};
use posture_engine::AnalysisResponse;
use serde::Deserialize;

use crate::{method_not_allowed, AppError, AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TargetRequest {
    /// Country display name, e.g. "France"
    #[serde(default)]
    pub country: Option<String>,
}

/// Parse `{ country }` out of a raw body. Anything that does not yield a
/// non-empty name is a validation failure.
pub(crate) fn parse_target(body: &[u8]) -> Result<String, AppError> {
    serde_json::from_slice::<TargetRequest>(body)
        .ok()
        .and_then(|req| req.country)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            tracing::info!(
                stage = %RequestStage::Rejected,
                body_len = body.len(),
                "request carried no usable country"
            );
            AppError::Posture(PostureError::Validation("country is required".to_string()))
        })
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze).fallback(method_not_allowed))
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = TargetRequest,
    responses(
        (status = 200, description = "Narrative report, string-formatted scores and classification"),
        (status = 400, description = "No country supplied"),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Directory link failure")
    ),
    tag = "Posture"
)]
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisResponse>, AppError> {
    let country = parse_target(&body)?;
    tracing::info!(country = %country, "posture assessment requested");

    let response = state.engine.analyze(&country).await?;
    Ok(Json(response))
}
