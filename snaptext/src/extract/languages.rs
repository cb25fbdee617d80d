use crate::error::{Result, SnaptextError};

/// Language set used when the caller selects nothing.
pub const DEFAULT_LANGUAGES: [&str; 4] = ["en", "es", "fr", "de"];

/// Fixed code → display-name table rendered by the UI. Static
/// configuration, not derived data.
pub const SUPPORTED_LANGUAGES: [(&str, &str); 10] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("ch_sim", "Chinese (Simplified)"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ru", "Russian"),
];

fn tesseract_code(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some("eng"),
        "es" => Some("spa"),
        "fr" => Some("fra"),
        "de" => Some("deu"),
        "ch_sim" => Some("chi_sim"),
        "ar" => Some("ara"),
        "hi" => Some("hin"),
        "ja" => Some("jpn"),
        "ko" => Some("kor"),
        "ru" => Some("rus"),
        _ => None,
    }
}

/// A non-empty set of supported language codes for the local backend.
///
/// An empty input is replaced by [`DEFAULT_LANGUAGES`]; unknown codes are
/// rejected. Duplicates collapse, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSelection(Vec<String>);

impl LanguageSelection {
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_lowercase();
            if code.is_empty() {
                continue;
            }
            if tesseract_code(&code).is_none() {
                return Err(SnaptextError::Validation(format!(
                    "Unsupported language code '{code}'"
                )));
            }
            if !selected.contains(&code) {
                selected.push(code);
            }
        }
        if selected.is_empty() {
            return Ok(Self::default_set());
        }
        Ok(Self(selected))
    }

    pub fn default_set() -> Self {
        Self(DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }

    /// Display names for the selected codes, in selection order.
    pub fn display_names(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .filter_map(|code| {
                SUPPORTED_LANGUAGES
                    .iter()
                    .find(|(c, _)| c == code)
                    .map(|(_, name)| *name)
            })
            .collect()
    }

    /// The `+`-joined language string Tesseract expects, e.g. `eng+spa`.
    pub fn tesseract_spec(&self) -> String {
        self.0
            .iter()
            .filter_map(|code| tesseract_code(code))
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl Default for LanguageSelection {
    fn default() -> Self {
        Self::default_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_selection_yields_default_set() {
        let selection = LanguageSelection::new(Vec::<String>::new()).unwrap();
        assert_eq!(selection.codes(), &["en", "es", "fr", "de"]);
        assert!(!selection.codes().is_empty());
    }

    #[test]
    fn blank_entries_are_ignored() {
        let selection = LanguageSelection::new(["", "  "]).unwrap();
        assert_eq!(selection, LanguageSelection::default_set());
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = LanguageSelection::new(["en", "xx"]).unwrap_err();
        assert!(err.to_string().contains("xx"));
    }

    #[test]
    fn duplicates_collapse_preserving_order() {
        let selection = LanguageSelection::new(["ja", "en", "ja"]).unwrap();
        assert_eq!(selection.codes(), &["ja", "en"]);
    }

    #[test]
    fn codes_are_case_insensitive() {
        let selection = LanguageSelection::new(["EN", "Ja"]).unwrap();
        assert_eq!(selection.codes(), &["en", "ja"]);
    }

    #[test]
    fn tesseract_spec_joins_with_plus() {
        let selection = LanguageSelection::new(["en", "es"]).unwrap();
        assert_eq!(selection.tesseract_spec(), "eng+spa");
        assert_eq!(
            LanguageSelection::default_set().tesseract_spec(),
            "eng+spa+fra+deu"
        );
    }

    #[test]
    fn display_names_follow_selection_order() {
        let selection = LanguageSelection::new(["ru", "ch_sim"]).unwrap();
        assert_eq!(selection.display_names(), vec!["Russian", "Chinese (Simplified)"]);
    }

    #[test]
    fn every_supported_language_has_a_tesseract_code() {
        for (code, _) in SUPPORTED_LANGUAGES {
            assert!(tesseract_code(code).is_some(), "missing mapping for {code}");
        }
    }
}
