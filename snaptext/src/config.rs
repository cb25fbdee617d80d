use std::env;

use crate::error::{Result, SnaptextError};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Expected literal prefix of a Gemini API key.
pub const API_KEY_PREFIX: &str = "AIza";
/// Minimum plausible key length; real keys are typically 39 characters.
pub const API_KEY_MIN_LEN: usize = 30;

/// Shown whenever the key is missing or malformed. Configuration problems
/// are fatal and require operator action, so the message carries the fix.
pub const API_KEY_REMEDIATION: &str = "Set your Gemini API key in one of the following ways:\n\
     1. Export GEMINI_API_KEY in the environment (or add it to a .env file)\n\
     2. Point GEMINI_API_KEY_FILE at a secret file containing the key\n\
     Get an API key from https://makersuite.google.com/app/apikey";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub ocr: OcrConfig,
    pub sessions: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Normalized, shape-validated API key.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_image_dimension: u32,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Default ISO-639-1 language codes for the local engine.
    pub languages: Vec<String>,
    pub timeout_secs: u64,
    pub max_image_dimension: u32,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub capacity: usize,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Fails fast when the Gemini API key is missing or malformed; that is
    /// a fatal, operator-facing condition, not a runtime-recoverable one.
    pub fn from_env() -> Result<Self> {
        let api_key = load_api_key()?;

        Ok(Self {
            server: ServerConfig {
                host: env::var("SNAPTEXT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("SNAPTEXT_PORT", 8395),
                max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
            },
            gemini: GeminiConfig {
                api_key,
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
                base_url: env::var("GEMINI_BASE_URL")
                    .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
                timeout_secs: parse_env_or("GEMINI_TIMEOUT", 60),
                max_image_dimension: parse_env_or("MAX_IMAGE_DIMENSION", 4096),
            },
            ocr: OcrConfig {
                languages: env::var("OCR_LANGUAGES")
                    .map(|langs| langs.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_else(|_| {
                        crate::extract::DEFAULT_LANGUAGES
                            .iter()
                            .map(|s| s.to_string())
                            .collect()
                    }),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
                max_image_dimension: parse_env_or("MAX_IMAGE_DIMENSION", 4096),
            },
            sessions: SessionConfig {
                capacity: parse_env_or("SESSION_CAPACITY", 1024),
            },
        })
    }
}

/// Resolve the Gemini API key from the ordered sources: process environment
/// first, then the secret file named by `GEMINI_API_KEY_FILE`.
pub fn load_api_key() -> Result<String> {
    let raw = match env::var("GEMINI_API_KEY") {
        Ok(val) if !val.trim().is_empty() => val,
        _ => match env::var("GEMINI_API_KEY_FILE") {
            Ok(path) => std::fs::read_to_string(&path).map_err(|e| {
                SnaptextError::Config(format!(
                    "Failed to read GEMINI_API_KEY_FILE ({path}): {e}\n{API_KEY_REMEDIATION}"
                ))
            })?,
            Err(_) => {
                return Err(SnaptextError::Config(format!(
                    "Gemini API key not found.\n{API_KEY_REMEDIATION}"
                )));
            }
        },
    };

    let key = normalize_api_key(&raw);
    validate_api_key(&key)?;
    Ok(key)
}

/// Strip the junk that commonly rides along with keys pasted into env files:
/// a byte-order mark, surrounding quotes, and any whitespace or control
/// characters anywhere in the value.
pub fn normalize_api_key(raw: &str) -> String {
    let stripped = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    cleaned.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Check the textual shape of a normalized key before it is ever used.
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(SnaptextError::Config(format!(
            "Gemini API key is empty after normalization.\n{API_KEY_REMEDIATION}"
        )));
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(SnaptextError::Config(format!(
            "Invalid API key format: Gemini API keys start with '{API_KEY_PREFIX}'.\n{API_KEY_REMEDIATION}"
        )));
    }
    if key.len() < API_KEY_MIN_LEN {
        return Err(SnaptextError::Config(format!(
            "API key is too short ({} characters): Gemini API keys are typically 39 characters.\n{API_KEY_REMEDIATION}",
            key.len()
        )));
    }
    Ok(())
}
