//! Image generator port for the ImageFX API.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::ImageFxError;
use crate::model::ModelType;
use crate::params::AspectRatio;

/// A request to generate images. Built fresh for every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Fixed seed, or `None` to let the server pick one.
    pub seed: Option<u32>,
    /// Aspect ratio of every candidate.
    pub aspect_ratio: AspectRatio,
    /// Server-side model variant.
    pub model: ModelType,
    /// Number of candidates to ask for.
    pub image_count: u32,
}

impl GenerationRequest {
    /// Request with default parameters: random seed, landscape, four images.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            seed: None,
            aspect_ratio: AspectRatio::default(),
            model: ModelType::default(),
            image_count: 4,
        }
    }
}

/// One raw image as returned by the provider, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderImage {
    /// Base64-encoded image file bytes (PNG or JPEG).
    pub encoded_image: String,
    /// Seed the server used for this candidate.
    #[serde(default)]
    pub seed: Option<i64>,
    /// Server-side media identifier.
    #[serde(default)]
    pub media_generation_id: Option<String>,
}

/// Raw payloads from one provider call, in the order the provider sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Zero or more raw images.
    pub images: Vec<ProviderImage>,
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProviderResponse, ImageFxError>> + Send + 'a>>;

/// Generates images from text prompts via an external API.
pub trait ImageGenerator: Send + Sync {
    /// Perform exactly one provider call for `request`, authenticated with
    /// `credential`.
    fn generate(&self, request: &GenerationRequest, credential: &Credential) -> GenerateFuture<'_>;
}
