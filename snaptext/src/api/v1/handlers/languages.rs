use crate::api::v1::dto::{LanguageInfo, LanguagesResponse};
use crate::api::v1::response::ApiResponse;
use crate::extract::{DEFAULT_LANGUAGES, SUPPORTED_LANGUAGES};

/// `GET /api/v1/languages`
///
/// The fixed ten-language table the local backend supports, plus the
/// default selection. Static configuration used to render checkboxes.
#[utoipa::path(
    get,
    path = "/api/v1/languages",
    tag = "languages",
    responses(
        (status = 200, description = "Supported languages and default selection", body = LanguagesResponse),
    )
)]
pub async fn list_languages() -> ApiResponse<LanguagesResponse> {
    ApiResponse::success(LanguagesResponse {
        languages: SUPPORTED_LANGUAGES
            .iter()
            .map(|(code, name)| LanguageInfo {
                code: code.to_string(),
                name: name.to_string(),
            })
            .collect(),
        default: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
    })
}
