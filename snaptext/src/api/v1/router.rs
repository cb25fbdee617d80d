use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;

pub fn v1_router() -> Router<AppState> {
    let sessions = Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route(
            "/{sessionId}/extractions:remote",
            post(handlers::extractions::extract_remote),
        )
        .route(
            "/{sessionId}/extractions:local",
            post(handlers::extractions::extract_local),
        )
        .route(
            "/{sessionId}/result",
            get(handlers::sessions::get_result).delete(handlers::sessions::clear_result),
        )
        .route(
            "/{sessionId}/result:download",
            get(handlers::sessions::download_result),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/languages", get(handlers::languages::list_languages))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router())
        .nest("/sessions", sessions)
}
