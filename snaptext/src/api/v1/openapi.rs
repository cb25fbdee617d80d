use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Snaptext API",
        version = "1.0.0",
        description = "Image-to-text extraction service. Hosted multimodal model or local OCR.",
    ),
    paths(
        handlers::health::health_check,
        handlers::languages::list_languages,
        handlers::sessions::create_session,
        handlers::extractions::extract_remote,
        handlers::extractions::extract_local,
        handlers::sessions::get_result,
        handlers::sessions::download_result,
        handlers::sessions::clear_result,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Sessions
        dto::CreateSessionResponse,
        dto::ResultResponse,
        dto::ClearResponse,
        // Extractions
        dto::ExtractionResponse,
        dto::ImageInfo,
        // Languages
        dto::LanguageInfo,
        dto::LanguagesResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::RemoteStatus,
        handlers::health::LocalStatus,
        // Stats
        crate::stats::TextStats,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "languages", description = "Supported local OCR languages"),
        (name = "sessions", description = "Session lifecycle and cached results"),
        (name = "extractions", description = "Image upload and text extraction"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
