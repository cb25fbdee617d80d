use thiserror::Error;

/// Tagged error returned by both extraction backends.
///
/// Backends classify every failure into one of these variants at the
/// backend boundary; transport and engine errors never cross it. The
/// presentation layer maps each tag to a user-facing display string
/// (see `api::v1::handlers::extractions::display_message`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The provider rejected the request, most commonly a bad API key
    /// or malformed payload (HTTP 400/401).
    #[error("invalid API credentials or malformed request")]
    InvalidCredentials,

    /// The API key is valid but lacks permission (HTTP 403).
    #[error("API key is invalid or doesn't have permission")]
    Forbidden,

    /// The provider rate-limited the request (HTTP 429). Not retried
    /// automatically; the user is told to wait and retry manually.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The provider filtered the response instead of returning text.
    #[error("content blocked: {0}")]
    Blocked(String),

    /// The local engine reported a GPU failure.
    #[error("GPU unavailable: {0}")]
    GpuUnavailable(String),

    /// The local engine ran out of memory, usually an oversized image.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The backend never initialized and cannot serve extractions.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Anything the backend could not classify further.
    #[error("{0}")]
    Backend(String),
}

impl ExtractionError {
    /// Machine-readable tag included in extraction responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::Blocked(_) => "blocked",
            Self::GpuUnavailable(_) => "gpu_unavailable",
            Self::ResourceExhausted(_) => "resource_exhausted",
            Self::Unavailable(_) => "unavailable",
            Self::Backend(_) => "backend_error",
        }
    }
}

/// Service-level error for everything outside the extraction boundary.
#[derive(Error, Debug)]
pub enum SnaptextError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SnaptextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_error_kinds_are_stable() {
        assert_eq!(ExtractionError::InvalidCredentials.kind(), "invalid_credentials");
        assert_eq!(ExtractionError::Forbidden.kind(), "forbidden");
        assert_eq!(ExtractionError::RateLimited.kind(), "rate_limited");
        assert_eq!(ExtractionError::Blocked("safety".into()).kind(), "blocked");
        assert_eq!(
            ExtractionError::GpuUnavailable("no device".into()).kind(),
            "gpu_unavailable"
        );
        assert_eq!(
            ExtractionError::ResourceExhausted("oom".into()).kind(),
            "resource_exhausted"
        );
        assert_eq!(ExtractionError::Unavailable("no engine".into()).kind(), "unavailable");
        assert_eq!(ExtractionError::Backend("boom".into()).kind(), "backend_error");
    }

    #[test]
    fn backend_error_displays_bare_message() {
        let err = ExtractionError::Backend("connection reset".into());
        assert_eq!(err.to_string(), "connection reset");
    }
}
