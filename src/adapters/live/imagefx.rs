//! Live adapter for the ImageFX `runImageFx` endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::credential::Credential;
use crate::error::ImageFxError;
use crate::ports::image_generator::{
    GenerateFuture, GenerationRequest, ImageGenerator, ProviderImage, ProviderResponse,
};

const ORIGIN: &str = "https://labs.google";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/133.0.0.0 Safari/537.36";

/// Live ImageFX generator: one POST per call, no retries.
pub struct ImageFxGenerator {
    client: Client,
    endpoint: String,
}

impl ImageFxGenerator {
    /// Create a generator posting to `endpoint`, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ImageFxError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

/// Build the `runImageFx` JSON body.
#[must_use]
pub fn request_body(request: &GenerationRequest, session_id: &str) -> serde_json::Value {
    serde_json::json!({
        "userInput": {
            "candidatesCount": request.image_count,
            "prompts": [request.prompt],
            "seed": request.seed,
        },
        "clientContext": {
            "sessionId": session_id,
            "tool": "IMAGE_FX",
        },
        "modelInput": {
            "modelNameType": request.model.wire_name(),
        },
        "aspectRatio": request.aspect_ratio.wire_name(),
    })
}

impl ImageGenerator for ImageFxGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> GenerateFuture<'_> {
        let session_id = format!(";{}", chrono::Utc::now().timestamp_millis());
        let body = request_body(request, &session_id);
        let authorization = credential.authorization_header();

        Box::pin(async move {
            tracing::debug!(
                endpoint = %self.endpoint,
                session_id = %session_id,
                "POST runImageFx"
            );

            let response = self
                .client
                .post(&self.endpoint)
                .header("accept", "*/*")
                .header("content-type", "text/plain;charset=UTF-8")
                .header("origin", ORIGIN)
                .header("referer", format!("{ORIGIN}/"))
                .header("authorization", authorization)
                .body(body.to_string())
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(status_error(status.as_u16(), response_text));
            }

            parse_response(&response_text)
        })
    }
}

/// Map a failing status code to the matching error kind.
fn status_error(status: u16, body: String) -> ImageFxError {
    if status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16() {
        ImageFxError::Auth { status, body }
    } else {
        ImageFxError::Server { status, body }
    }
}

/// Parse a 2xx `runImageFx` body into raw payloads.
///
/// # Errors
///
/// Returns `MalformedResponse` if the body is not the expected JSON, or the
/// mapped status error if the body carries an `error` object.
pub fn parse_response(body: &str) -> Result<ProviderResponse, ImageFxError> {
    let parsed: RunImageFxResponse = serde_json::from_str(body).map_err(|e| {
        ImageFxError::MalformedResponse(format!("{e}. Body: {}", truncate(body)))
    })?;

    if let Some(error) = parsed.error {
        let status = error.code.unwrap_or(500);
        let message = format!(
            "{} ({})",
            error.message.unwrap_or_default(),
            error.status.unwrap_or_default()
        );
        return Err(status_error(status, message));
    }

    let images = parsed
        .image_panels
        .into_iter()
        .flat_map(|panel| panel.generated_images)
        .filter(|image| !image.encoded_image.is_empty())
        .map(|image| ProviderImage {
            encoded_image: image.encoded_image,
            seed: image.seed,
            media_generation_id: image.media_generation_id,
        })
        .collect();

    Ok(ProviderResponse { images })
}

fn truncate(body: &str) -> String {
    if body.len() > 500 {
        let cut = (0..=500).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

// --- ImageFX API response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunImageFxResponse {
    #[serde(default)]
    image_panels: Vec<ImagePanel>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagePanel {
    #[serde(default)]
    generated_images: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedImage {
    #[serde(default)]
    encoded_image: String,
    seed: Option<i64>,
    media_generation_id: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}
