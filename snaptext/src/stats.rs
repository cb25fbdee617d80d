use serde::Serialize;

/// Derived counts for an extraction result. Computed on demand from the
/// cached string, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TextStats {
    /// Number of characters (Unicode scalar values, not bytes).
    pub characters: usize,
    /// Number of whitespace-delimited tokens.
    pub words: usize,
    /// Number of newline-delimited segments. An empty string is one line.
    pub lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.split('\n').count(),
        }
    }
}
