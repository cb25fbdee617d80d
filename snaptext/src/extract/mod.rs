//! Text extraction backends.
//!
//! Two interchangeable implementations of [`TextExtractor`]:
//! - [`remote::GeminiExtractor`] sends one hosted-model call per extraction.
//! - [`local::LocalOcrExtractor`] runs a local Tesseract engine, owned per
//!   language selection.
//!
//! Both normalize the input to three-channel RGB and downscale oversized
//! images before extraction, and both convert every failure into a tagged
//! [`ExtractionError`] at this boundary; callers never see transport or
//! engine exceptions.

mod languages;
mod preprocess;

pub mod local;
pub mod remote;

pub use languages::{LanguageSelection, DEFAULT_LANGUAGES, SUPPORTED_LANGUAGES};
pub use preprocess::{decode_image, encode_png, normalize_for_extraction};

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::ExtractionError;

/// Sentinel returned by the remote backend when the model finds no text.
pub const REMOTE_NO_TEXT_SENTINEL: &str = "No text could be extracted from the image.";
/// Sentinel returned by the local backend when the engine finds no text.
pub const LOCAL_NO_TEXT_SENTINEL: &str = "No text found in the image.";

/// The single capability both backends implement: take a decoded image,
/// return extracted text or a tagged error.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &DynamicImage) -> Result<String, ExtractionError>;
}
