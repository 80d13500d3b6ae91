//! StratScope HTTP API.
//!
//! Routes:
//! - `POST /analyze`: posture assessment (scores, classification, report)
//! - `POST /reasoning`: reasoning-service passthrough
//! - `GET /headlines`: headline-service passthrough
//! - `GET /health`, `GET /api-docs/openapi.json`

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use directory_client::DirectoryClient;
use intel_client::{IntelClient, IntelError};
use posture_core::PostureError;
use posture_engine::{PostureEngine, ResponseAssembler};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub mod analyze_routes;
pub mod config;
pub mod intel_routes;
pub mod security_headers;

pub use config::ServerConfig;

use analyze_routes::analyze_routes;
use intel_routes::intel_routes;
use security_headers::security_headers_middleware;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REASONING_FALLBACK: &str =
    "Analysis unavailable. The reasoning service did not return an assessment.";
const HEADLINES_FAILED: &str = "headline retrieval failed";
const HEADLINES_FALLBACK: &str = "Headline feed unavailable.";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PostureEngine>,
    pub intel: Arc<IntelClient>,
    pub enable_hsts: bool,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        let directory = Arc::new(DirectoryClient::new(config.directory_url.clone()));
        Self {
            engine: Arc::new(PostureEngine::new(
                directory,
                config.learning.clone(),
                config.formula_version,
            )),
            intel: Arc::new(IntelClient::new(config.intel.clone())),
            enable_hsts: config.enable_hsts,
        }
    }
}

/// Every failure the HTTP surface reports. Each one renders a body with a
/// short `error` code and a displayable `analysis` fallback.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Posture(#[from] PostureError),

    #[error("reasoning proxy: {0}")]
    Reasoning(IntelError),

    #[error("headline proxy: {0}")]
    Headlines(IntelError),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Posture(e) if e.is_upstream() => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Posture(_) => StatusCode::BAD_REQUEST,
            AppError::Reasoning(e) if e.is_bad_gateway() => StatusCode::BAD_GATEWAY,
            AppError::Reasoning(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Headlines(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

fn reasoning_error_code(e: &IntelError) -> &'static str {
    match e {
        IntelError::Unauthorized => "reasoning service rejected the API key",
        IntelError::PaymentRequired => "reasoning service balance exhausted",
        IntelError::RateLimited => "reasoning service rate limit reached",
        IntelError::UpstreamStatus(_) | IntelError::InvalidResponse(_) => {
            "reasoning service failure"
        }
        IntelError::RequestFailed(_) => "reasoning link failure",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Posture(PostureError::Validation(_)) => ResponseAssembler::missing_target(),
            AppError::Posture(e) => {
                tracing::error!(error = %e, "directory link failure");
                ResponseAssembler::link_failure()
            }
            AppError::Reasoning(e) => {
                tracing::error!(error = %e, "reasoning proxy failure");
                ResponseAssembler::failure(reasoning_error_code(e), REASONING_FALLBACK)
            }
            AppError::Headlines(e) => {
                tracing::error!(error = %e, "headline proxy failure");
                ResponseAssembler::failure(HEADLINES_FAILED, HEADLINES_FALLBACK)
            }
            AppError::MethodNotAllowed => ResponseAssembler::method_not_allowed(),
        };

        (status, Json(body)).into_response()
    }
}

pub(crate) async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[derive(OpenApi)]
#[openapi(
    info(title = "StratScope API", description = "Geopolitical posture scoring"),
    paths(
        analyze_routes::analyze,
        intel_routes::reasoning,
        intel_routes::headlines,
    ),
    components(schemas(analyze_routes::TargetRequest, intel_routes::ReasoningResponse)),
    tags(
        (name = "Posture", description = "Composite scoring and classification"),
        (name = "Intel", description = "External reasoning and headline passthroughs")
    )
)]
pub struct ApiDoc;

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "formula": state.engine.formula_version().as_str(),
        "calibration": state.engine.learning().version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(analyze_routes())
        .merge(intel_routes())
        .layer(middleware::from_fn_with_state(
            state.enable_hsts,
            security_headers_middleware,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                // Set by SetRequestIdLayer, which runs before this span opens
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "api_server=info,posture_engine=info,directory_client=warn,intel_client=warn,tower_http=info"
            .into()
    });

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        formula = config.formula_version.as_str(),
        calibration = %config.learning.version,
        reliability = config.learning.reliability_index,
        "Calibration loaded"
    );
    if config.intel.reasoning_api_key.is_none() {
        tracing::warn!("REASONING_API_KEY not set; /reasoning will be rejected upstream");
    }
    if config.intel.headlines_api_key.is_none() {
        tracing::warn!("NEWS_API_KEY not set; /headlines will be rejected upstream");
    }

    let app = build_router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("StratScope API listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
