use serde::Serialize;

use crate::stats::TextStats;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LanguageInfo {
    /// ISO-639-1 code (plus `ch_sim` for Simplified Chinese).
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
    /// Codes selected when the caller picks nothing.
    pub default: Vec<String>,
}

/// Pixel dimensions and byte size of the uploaded image, echoed back for
/// display alongside the result.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub file_bytes: usize,
}

/// Outcome of one extraction call. `text` is always present: on backend
/// failure it holds the mapped display string and `errorKind` carries the
/// machine-readable tag.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub backend: String,
    pub text: String,
    pub stats: TextStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Display names of the languages used (local backend only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    pub image: ImageInfo,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub text: String,
    pub stats: TextStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ClearResponse {
    /// Whether a cached result was actually removed.
    pub cleared: bool,
}
