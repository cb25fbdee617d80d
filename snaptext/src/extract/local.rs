use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use leptess::LepTess;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::ExtractionError;

use super::{
    encode_png, normalize_for_extraction, LanguageSelection, TextExtractor, LOCAL_NO_TEXT_SENTINEL,
};

enum LocalBackend {
    Ready { engine: Arc<Mutex<LepTess>> },
    Unavailable { reason: String },
}

/// Local OCR extraction backend.
///
/// Construction eagerly initializes a Tesseract engine for the given
/// language selection. That step is expensive and blocking, and it is
/// redone whenever the selection changes; engines are not cached across
/// selections. If the engine cannot initialize (missing traineddata,
/// missing shared library) the backend degrades to an unavailable state
/// instead of failing the whole service.
pub struct LocalOcrExtractor {
    backend: LocalBackend,
    selection: LanguageSelection,
    max_dimension: u32,
    timeout_secs: u64,
}

fn create_engine(spec: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, spec).map_err(|e| e.to_string())
}

fn classify_engine_error(message: &str) -> ExtractionError {
    if message.contains("CUDA") || message.contains("cuda") {
        ExtractionError::GpuUnavailable(message.to_string())
    } else if message.contains("out of memory") {
        ExtractionError::ResourceExhausted(message.to_string())
    } else {
        ExtractionError::Backend(message.to_string())
    }
}

/// Join detected fragments with single spaces. The engine emits
/// paragraph-grouped plain text; each non-empty line is one fragment.
fn join_fragments(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl LocalOcrExtractor {
    pub fn new(selection: LanguageSelection, config: &OcrConfig) -> Self {
        let spec = selection.tesseract_spec();
        let backend = match create_engine(&spec) {
            Ok(engine) => {
                info!(languages = %spec, "Local OCR engine initialized");
                LocalBackend::Ready {
                    engine: Arc::new(Mutex::new(engine)),
                }
            }
            Err(e) => {
                let reason = format!("Tesseract not available for '{spec}': {e}");
                warn!("{}", reason);
                LocalBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            selection,
            max_dimension: config.max_image_dimension,
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn selection(&self) -> &LanguageSelection {
        &self.selection
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, LocalBackend::Ready { .. })
    }

    async fn extract_inner(
        &self,
        image: &DynamicImage,
    ) -> std::result::Result<String, ExtractionError> {
        let engine = match &self.backend {
            LocalBackend::Ready { engine } => Arc::clone(engine),
            LocalBackend::Unavailable { reason } => {
                return Err(ExtractionError::Unavailable(reason.clone()));
            }
        };

        let normalized = normalize_for_extraction(image, self.max_dimension);
        let png = encode_png(&normalized).map_err(|e| ExtractionError::Backend(e.to_string()))?;

        let raw = tokio::task::spawn_blocking(move || {
            let mut engine = engine.blocking_lock();
            engine
                .set_image_from_mem(&png)
                .map_err(|e| classify_engine_error(&format!("Failed to set image: {e}")))?;
            engine
                .get_utf8_text()
                .map_err(|e| classify_engine_error(&e.to_string()))
        })
        .await
        .map_err(|e| ExtractionError::Backend(format!("OCR task panicked: {e}")))??;

        let text = join_fragments(&raw);
        if text.is_empty() {
            Ok(LOCAL_NO_TEXT_SENTINEL.to_string())
        } else {
            Ok(text)
        }
    }
}

#[async_trait]
impl TextExtractor for LocalOcrExtractor {
    async fn extract(&self, image: &DynamicImage) -> std::result::Result<String, ExtractionError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        match tokio::time::timeout(timeout, self.extract_inner(image)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractionError::Backend(format!(
                "OCR operation timed out after {} seconds",
                self.timeout_secs
            ))),
        }
    }
}

/// Owns the current local extractor and rebuilds it when the language
/// selection changes. The engine is not safe for concurrent reuse, so the
/// lock also serializes simultaneous local extractions within one process.
pub struct LocalOcrProvider {
    config: OcrConfig,
    current: Mutex<LocalOcrExtractor>,
}

impl LocalOcrProvider {
    pub fn new(config: &OcrConfig) -> Self {
        let selection = LanguageSelection::new(config.languages.iter())
            .unwrap_or_else(|_| LanguageSelection::default_set());
        let current = Mutex::new(LocalOcrExtractor::new(selection, config));
        Self {
            config: config.clone(),
            current,
        }
    }

    pub async fn is_available(&self) -> bool {
        self.current.lock().await.is_available()
    }

    pub async fn current_selection(&self) -> LanguageSelection {
        self.current.lock().await.selection().clone()
    }

    /// Extract with the given language selection, rebuilding the engine
    /// first if the selection differs from the current one. Known
    /// inefficiency: switching selections back and forth pays the full
    /// engine initialization cost each time.
    pub async fn extract_with(
        &self,
        selection: LanguageSelection,
        image: &DynamicImage,
    ) -> std::result::Result<String, ExtractionError> {
        let mut current = self.current.lock().await;
        if current.selection() != &selection {
            info!(languages = %selection.tesseract_spec(), "Rebuilding local OCR engine");
            *current = LocalOcrExtractor::new(selection, &self.config);
        }
        current.extract(image).await
    }
}
