//! v1 extraction handlers.
//!
//! One upload-and-extract operation per backend. Uploads are validated
//! against a per-backend extension allow-list, decoded, and handed to the
//! selected backend. The returned string (extracted text or a mapped
//! error display string) is cached in the session so the result, stats,
//! download, and clear operations all share a single code path.

use axum::extract::{Multipart, Path, State};
use image::DynamicImage;

use crate::api::v1::dto::{ExtractionResponse, ImageInfo};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::ExtractionError;
use crate::extract::{decode_image, LanguageSelection, TextExtractor};
use crate::stats::TextStats;

/// Upload extensions accepted by the remote backend.
const REMOTE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
/// Upload extensions accepted by the local backend.
const LOCAL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff"];

/// Map a tagged backend error to the display string shown in place of
/// extracted text. Rate-limit wording is load-bearing: clients look for
/// "Rate limit exceeded".
pub(crate) fn display_message(err: &ExtractionError) -> String {
    match err {
        ExtractionError::InvalidCredentials => "Error 400: Bad Request. \
             Possible causes: an invalid API key, an image the provider rejected, \
             or exhausted quota. Verify that GEMINI_API_KEY starts with 'AIza' and \
             is about 39 characters, and that you have quota remaining."
            .to_string(),
        ExtractionError::Forbidden => {
            "Error 403: API key is invalid or doesn't have permission".to_string()
        }
        ExtractionError::RateLimited => {
            "Error 429: Rate limit exceeded. Please wait a moment and try again".to_string()
        }
        ExtractionError::Blocked(reason) => format!("Content was blocked: {reason}"),
        ExtractionError::GpuUnavailable(_) => {
            "CUDA error: GPU not available or insufficient memory".to_string()
        }
        ExtractionError::ResourceExhausted(_) => {
            "Memory error: Image too large for processing".to_string()
        }
        ExtractionError::Unavailable(reason) => {
            format!("Extraction backend unavailable: {reason}")
        }
        ExtractionError::Backend(msg) => format!("Error extracting text: {msg}"),
    }
}

struct Upload {
    image: DynamicImage,
    file_bytes: usize,
    languages: Vec<String>,
}

fn extension_allowed(file_name: &str, allowed: &[&str]) -> bool {
    file_name
        .rsplit('.')
        .next()
        .map(|ext| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read the multipart upload: a `file` field plus optional repeated
/// `languages` fields (single values or comma-separated).
async fn read_upload(
    mut multipart: Multipart,
    allowed_extensions: &[&str],
    max_bytes: usize,
) -> Result<Upload, ApiResponse<ExtractionResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut languages: Vec<String> = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = match field.bytes().await {
                    Ok(b) => b,
                    Err(e) => {
                        return Err(ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            format!("Failed to read file: {e}"),
                        ));
                    }
                };
                if bytes.len() > max_bytes {
                    return Err(ApiResponse::error(
                        ErrorCode::InvalidRequest,
                        format!(
                            "File too large: {} bytes (max {} bytes)",
                            bytes.len(),
                            max_bytes
                        ),
                    ));
                }
                file = Some((file_name, bytes.to_vec()));
            }
            "languages" => {
                let raw = match field.text().await {
                    Ok(t) => t,
                    Err(e) => {
                        return Err(ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            format!("Invalid languages field: {e}"),
                        ));
                    }
                };
                languages.extend(raw.split(',').map(|s| s.trim().to_string()));
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(ApiResponse::error(
            ErrorCode::InvalidRequest,
            "Missing 'file' field in upload",
        ));
    };

    if !extension_allowed(&file_name, allowed_extensions) {
        return Err(ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!(
                "Unsupported file format. Please upload one of: {}",
                allowed_extensions.join(", ")
            ),
        ));
    }

    let file_bytes = bytes.len();
    let image = match decode_image(&bytes) {
        Ok(img) => img,
        Err(e) => return Err(e.into()),
    };

    Ok(Upload {
        image,
        file_bytes,
        languages,
    })
}

/// Run an extraction through the shared [`TextExtractor`] seam and fold
/// the outcome into the single success/failure-as-text result string.
async fn run_extraction(
    extractor: &dyn TextExtractor,
    image: &DynamicImage,
) -> (String, Option<String>) {
    match extractor.extract(image).await {
        Ok(text) => (text, None),
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "Extraction failed");
            (display_message(&e), Some(e.kind().to_string()))
        }
    }
}

/// `POST /api/v1/sessions/{sessionId}/extractions:remote`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/extractions:remote",
    tag = "extractions",
    params(("sessionId" = String, Path, description = "Session id")),
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload with optional languages fields"),
    responses(
        (status = 200, description = "Extraction completed (text may be an error display string)", body = ExtractionResponse),
        (status = 400, description = "Invalid upload", body = crate::api::v1::response::ApiError),
        (status = 404, description = "Unknown session", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn extract_remote(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> ApiResponse<ExtractionResponse> {
    if let Err(e) = state.sessions.get(&session_id).await {
        return e.into();
    }

    let upload =
        match read_upload(multipart, REMOTE_EXTENSIONS, state.config.server.max_upload_bytes).await
        {
            Ok(u) => u,
            Err(resp) => return resp,
        };

    let (text, error_kind) = run_extraction(state.remote.as_ref(), &upload.image).await;

    if let Err(e) = state.sessions.store_result(&session_id, text.clone(), None).await {
        return e.into();
    }

    let stats = TextStats::of(&text);
    ApiResponse::success(ExtractionResponse {
        backend: "remote".to_string(),
        stats,
        error_kind,
        languages: None,
        image: ImageInfo {
            width: upload.image.width(),
            height: upload.image.height(),
            file_bytes: upload.file_bytes,
        },
        text,
    })
}

/// `POST /api/v1/sessions/{sessionId}/extractions:local`
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{sessionId}/extractions:local",
    tag = "extractions",
    params(("sessionId" = String, Path, description = "Session id")),
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload with optional languages fields"),
    responses(
        (status = 200, description = "Extraction completed (text may be an error display string)", body = ExtractionResponse),
        (status = 400, description = "Invalid upload or language selection", body = crate::api::v1::response::ApiError),
        (status = 404, description = "Unknown session", body = crate::api::v1::response::ApiError),
    )
)]
pub async fn extract_local(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> ApiResponse<ExtractionResponse> {
    if let Err(e) = state.sessions.get(&session_id).await {
        return e.into();
    }

    let upload =
        match read_upload(multipart, LOCAL_EXTENSIONS, state.config.server.max_upload_bytes).await {
            Ok(u) => u,
            Err(resp) => return resp,
        };

    let selection = match LanguageSelection::new(upload.languages.iter()) {
        Ok(s) => s,
        Err(e) => return e.into(),
    };

    let (text, error_kind) = match state
        .local
        .extract_with(selection.clone(), &upload.image)
        .await
    {
        Ok(text) => (text, None),
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "Extraction failed");
            (display_message(&e), Some(e.kind().to_string()))
        }
    };

    if let Err(e) = state
        .sessions
        .store_result(&session_id, text.clone(), Some(selection.clone()))
        .await
    {
        return e.into();
    }

    let stats = TextStats::of(&text);
    ApiResponse::success(ExtractionResponse {
        backend: "local".to_string(),
        stats,
        error_kind,
        languages: Some(
            selection
                .display_names()
                .iter()
                .map(|n| n.to_string())
                .collect(),
        ),
        image: ImageInfo {
            width: upload.image.width(),
            height: upload.image.height(),
            file_bytes: upload.file_bytes,
        },
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(extension_allowed("scan.PNG", REMOTE_EXTENSIONS));
        assert!(extension_allowed("photo.jpeg", REMOTE_EXTENSIONS));
        assert!(!extension_allowed("doc.pdf", REMOTE_EXTENSIONS));
        assert!(!extension_allowed("noextension", REMOTE_EXTENSIONS));
    }

    #[test]
    fn local_allow_list_is_wider_than_remote() {
        assert!(extension_allowed("scan.tiff", LOCAL_EXTENSIONS));
        assert!(extension_allowed("scan.bmp", LOCAL_EXTENSIONS));
        assert!(!extension_allowed("scan.tiff", REMOTE_EXTENSIONS));
        assert!(!extension_allowed("scan.bmp", REMOTE_EXTENSIONS));
    }

    #[test]
    fn rate_limit_display_contains_expected_phrase() {
        let msg = display_message(&ExtractionError::RateLimited);
        assert!(msg.contains("Rate limit exceeded"));
    }

    #[test]
    fn blocked_display_names_the_reason() {
        let msg = display_message(&ExtractionError::Blocked("SAFETY".into()));
        assert_eq!(msg, "Content was blocked: SAFETY");
    }

    #[test]
    fn forbidden_display_mentions_permission() {
        let msg = display_message(&ExtractionError::Forbidden);
        assert!(msg.contains("403"));
        assert!(msg.contains("permission"));
    }

    #[test]
    fn gpu_and_memory_displays_are_stable() {
        assert!(display_message(&ExtractionError::GpuUnavailable("x".into())).contains("CUDA"));
        assert!(
            display_message(&ExtractionError::ResourceExhausted("x".into()))
                .contains("too large")
        );
    }

    #[test]
    fn generic_display_carries_backend_message() {
        let msg = display_message(&ExtractionError::Backend("socket closed".into()));
        assert_eq!(msg, "Error extracting text: socket closed");
    }
}
