use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::v1::dto::{ClearResponse, CreateSessionResponse, ResultResponse};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::stats::TextStats;

/// Disposition header for the plain-text download artifact.
const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"extracted_text.txt\"";

/// `POST /api/v1/sessions`
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
    )
)]
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<CreateSessionResponse> {
    let session_id = state.sessions.create().await;
    ApiResponse::created(CreateSessionResponse { session_id })
}

/// `GET /api/v1/sessions/{sessionId}/result`
///
/// The cached extraction result with derived statistics. 404 when the
/// session does not exist or holds no result.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/result",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Cached extraction result", body = ResultResponse),
        (status = 404, description = "No cached result", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn get_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<ResultResponse> {
    let session = match state.sessions.get(&session_id).await {
        Ok(s) => s,
        Err(e) => return e.into(),
    };

    match session.result {
        Some(text) => {
            let stats = TextStats::of(&text);
            let languages = session
                .languages
                .map(|s| s.display_names().iter().map(|n| n.to_string()).collect());
            ApiResponse::success(ResultResponse {
                text,
                stats,
                languages,
            })
        }
        None => ApiResponse::error(
            ErrorCode::NotFound,
            format!("Session {session_id} has no cached result"),
        ),
    }
}

/// `GET /api/v1/sessions/{sessionId}/result:download`
///
/// Serializes the cached result as a `text/plain` attachment named
/// `extracted_text.txt`.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{sessionId}/result:download",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Plain-text download", content_type = "text/plain"),
        (status = 404, description = "No cached result", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn download_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match state.sessions.get(&session_id).await {
        Ok(s) => s,
        Err(e) => return ApiResponse::<()>::from(e).into_response(),
    };

    let Some(text) = session.result else {
        return ApiResponse::<()>::error(
            ErrorCode::NotFound,
            format!("Session {session_id} has no cached result"),
        )
        .into_response();
    };

    let mut response = Response::new(Body::from(text));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(DOWNLOAD_DISPOSITION),
    );
    response
}

/// `DELETE /api/v1/sessions/{sessionId}/result`
///
/// Clears the cached result and language selection, reverting the session
/// to its pre-extraction state.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{sessionId}/result",
    tag = "sessions",
    params(("sessionId" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Result cleared", body = ClearResponse),
        (status = 404, description = "Unknown session", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn clear_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResponse<ClearResponse> {
    match state.sessions.clear_result(&session_id).await {
        Ok(cleared) => ApiResponse::success(ClearResponse { cleared }),
        Err(e) => e.into(),
    }
}
