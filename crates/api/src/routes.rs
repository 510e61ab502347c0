use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use equity_core::domain::analysis::AnalysisResult;
use equity_core::domain::contract::{AnalysisRequest, ErrorBody, HealthStatus};
use equity_core::service::AnalysisService;
use equity_core::AnalyzeError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: AnalysisService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.service.health())
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "rejected analyze body");
        ApiError(AnalyzeError::InvalidRequest)
    })?;

    let result = state.service.analyze(request).await?;
    Ok(Json(result))
}

/// Boundary conversion from the core taxonomy to a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub AnalyzeError);

impl From<AnalyzeError> for ApiError {
    fn from(value: AnalyzeError) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);

        if err.is_client_error() {
            tracing::warn!(status = status.as_u16(), "{err}");
        } else {
            if matches!(
                err,
                AnalyzeError::InternalError(_) | AnalyzeError::MalformedUpstreamResponse
            ) {
                sentry::capture_error(&err);
            }
            tracing::error!(status = status.as_u16(), error = %err, "analysis failed");
        }

        (status, Json(ErrorBody::from(&err))).into_response()
    }
}
