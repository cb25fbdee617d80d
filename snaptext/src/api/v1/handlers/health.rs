use axum::extract::State;
use serde::Serialize;

use crate::api::v1::response::ApiResponse;
use crate::api::AppState;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub remote: RemoteStatus,
    pub local: LocalStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RemoteStatus {
    pub status: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LocalStatus {
    pub status: String,
    pub languages: Vec<String>,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let local_status = if state.local.is_available().await {
        "available"
    } else {
        "unavailable"
    };
    let selection = state.local.current_selection().await;

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        remote: RemoteStatus {
            status: "configured".to_string(),
            model: state.remote.model().to_string(),
        },
        local: LocalStatus {
            status: local_status.to_string(),
            languages: selection.codes().to_vec(),
        },
    })
}
