//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{
    error::{ApiError, ApiResult},
    routing::CacheStats,
    state::AppState,
};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub mode: &'static str,
    pub backend: String,
    pub org_cache: Option<CacheStats>,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend_status = match state.loader.directory().health_check().await {
        Ok(()) => "healthy".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Backend health check failed");
            "unhealthy".to_string()
        }
    };

    let overall_status = if backend_status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        overall_status,
        Json(HealthResponse {
            status: if overall_status == StatusCode::OK {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: if state.config.is_selfhosted {
                "selfhosted"
            } else {
                "hosted"
            },
            backend: backend_status,
            org_cache: state.org_cache.as_ref().map(|cache| cache.stats()),
        }),
    )
}

/// Liveness probe (just returns 200 if the server is running)
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe (checks if the backend is reachable)
pub async fn readiness(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state
        .loader
        .directory()
        .health_check()
        .await
        .map(|()| StatusCode::OK)
        .map_err(|e| {
            tracing::warn!(error = %e, "Readiness check failed");
            ApiError::ServiceUnavailable
        })
}
