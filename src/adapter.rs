//! The `generate` entry point: credential, one provider call, normalization.

use thiserror::Error;

use crate::credential::CredentialResolver;
use crate::debug_log::DebugLog;
use crate::error::ImageFxError;
use crate::normalize::{normalize, GenerationResult, PlaceholderPolicy};
use crate::ports::{GenerationRequest, ImageGenerator};

/// A successful invocation.
#[derive(Debug)]
pub struct GenerationOutput {
    /// Exactly four images.
    pub result: GenerationResult,
    /// Steps taken (empty unless debug was requested).
    pub log: DebugLog,
}

impl GenerationOutput {
    /// The debug log as a single string.
    #[must_use]
    pub fn log_text(&self) -> String {
        self.log.render()
    }
}

/// A failed invocation. No images are returned, only the log.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct GenerationFailure {
    /// What went wrong.
    #[source]
    pub error: ImageFxError,
    /// Steps taken up to the failure (empty unless debug was requested).
    pub log: DebugLog,
}

/// Prompt-to-image adapter.
///
/// Each call runs ResolveCredential, CallProvider, Normalize and Return once,
/// in that order. Nothing is retried and no state survives between calls.
pub struct Adapter {
    resolver: CredentialResolver,
    generator: Box<dyn ImageGenerator>,
    placeholder: PlaceholderPolicy,
}

impl Adapter {
    /// Assemble an adapter from its parts.
    #[must_use]
    pub fn new(
        resolver: CredentialResolver,
        generator: Box<dyn ImageGenerator>,
        placeholder: PlaceholderPolicy,
    ) -> Self {
        Self {
            resolver,
            generator,
            placeholder,
        }
    }

    /// Generate four images for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationFailure`] carrying `MissingCredential`,
    /// `Network`, `Auth`, `Server` or `MalformedResponse`. Per-image decode
    /// failures are recovered with placeholders and never surface here.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        debug: bool,
    ) -> Result<GenerationOutput, GenerationFailure> {
        let mut log = DebugLog::new(debug);

        log.info("Resolving credential");
        let credential = match self.resolver.resolve(&mut log) {
            Ok(credential) => credential,
            Err(error) => return Err(fail(error, log)),
        };

        log.info(format!(
            "Requesting {} image(s): model {}, aspect ratio {}, seed {}",
            request.image_count,
            request.model,
            request.aspect_ratio,
            request.seed.map_or_else(|| "random".to_string(), |s| s.to_string())
        ));
        log.info(format!("Prompt: {}", request.prompt));
        let response = match self.generator.generate(request, &credential).await {
            Ok(response) => response,
            Err(error) => return Err(fail(error, log)),
        };
        log.info(format!("Provider returned {} image(s)", response.images.len()));
        for image in &response.images {
            if let Some(ref id) = image.media_generation_id {
                log.info(format!("Media id {id}"));
            }
        }

        let result = normalize(&response.images, &self.placeholder, &mut log);
        log.info(format!("Returning {} decoded image(s)", result.decoded_count()));

        Ok(GenerationOutput { result, log })
    }
}

fn fail(error: ImageFxError, mut log: DebugLog) -> GenerationFailure {
    log.error(format!("{}: {error}", error.kind()));
    GenerationFailure { error, log }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use base64::Engine;
    use image::{DynamicImage, ImageFormat, RgbaImage};

    use super::*;
    use crate::credential::{Credential, StaticTokenSource};
    use crate::normalize::ImageSlot;
    use crate::ports::image_generator::GenerateFuture;
    use crate::ports::{ProviderImage, ProviderResponse};

    /// Returns a canned outcome and counts calls.
    struct FakeGenerator {
        outcome: fn() -> Result<ProviderResponse, ImageFxError>,
        calls: Arc<AtomicUsize>,
    }

    impl ImageGenerator for FakeGenerator {
        fn generate(
            &self,
            _request: &GenerationRequest,
            credential: &Credential,
        ) -> GenerateFuture<'_> {
            assert_eq!(credential.token(), "abc123");
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = (self.outcome)();
            Box::pin(async move { outcome })
        }
    }

    fn png_payload() -> ProviderImage {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::new(6, 4))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        ProviderImage {
            encoded_image: base64::engine::general_purpose::STANDARD.encode(buf.into_inner()),
            seed: Some(1234),
            media_generation_id: Some("media-1".into()),
        }
    }

    fn response(images: Vec<ProviderImage>) -> Result<ProviderResponse, ImageFxError> {
        Ok(ProviderResponse { images })
    }

    fn adapter(
        token: Option<&str>,
        outcome: fn() -> Result<ProviderResponse, ImageFxError>,
    ) -> (Adapter, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![Box::new(StaticTokenSource::new(
            "test token",
            token.map(String::from),
        ))]);
        let generator = FakeGenerator {
            outcome,
            calls: Arc::clone(&calls),
        };
        (Adapter::new(resolver, Box::new(generator), PlaceholderPolicy::default()), calls)
    }

    #[tokio::test]
    async fn two_payloads_yield_two_images_and_two_placeholders() {
        let (adapter, calls) = adapter(Some("abc123"), || {
            response(vec![png_payload(), png_payload()])
        });

        let output = adapter
            .generate(&GenerationRequest::new("a cat"), true)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let kinds: Vec<_> = output
            .result
            .slots()
            .iter()
            .map(ImageSlot::is_placeholder)
            .collect();
        assert_eq!(kinds, vec![false, false, true, true]);
        assert!(output.log.contains("Provider returned 2 image(s)"));
        assert!(output.log.contains("media-1"));
        assert!(output.log_text().contains("Returning 2 decoded image(s)"));
    }

    #[tokio::test]
    async fn missing_credential_never_calls_provider() {
        let (adapter, calls) = adapter(None, || Ok(ProviderResponse::default()));

        let failure = adapter
            .generate(&GenerationRequest::new("a cat"), true)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, ImageFxError::MissingCredential { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(failure.log.contains("MissingCredential"));
    }

    #[tokio::test]
    async fn auth_error_is_terminal_and_logged_with_status() {
        let (adapter, _) = adapter(Some("abc123"), || {
            Err(ImageFxError::Auth {
                status: 401,
                body: "invalid credentials".into(),
            })
        });

        let failure = adapter
            .generate(&GenerationRequest::new("a cat"), true)
            .await
            .unwrap_err();

        assert!(matches!(failure.error, ImageFxError::Auth { status: 401, .. }));
        assert!(failure.log.contains("401"));
        assert_eq!(failure.to_string(), "Authentication rejected (401): invalid credentials");
    }

    #[tokio::test]
    async fn disabled_debug_leaves_log_empty() {
        let (adapter, _) = adapter(Some("abc123"), || Ok(ProviderResponse::default()));

        let output = adapter
            .generate(&GenerationRequest::new("a cat"), false)
            .await
            .unwrap();

        assert_eq!(output.result.decoded_count(), 0);
        assert_eq!(output.result.slots().len(), 4);
        assert!(output.log_text().is_empty());
    }

    #[tokio::test]
    async fn every_successful_call_returns_four_entries() {
        let outcomes: [fn() -> Result<ProviderResponse, ImageFxError>; 3] = [
            || Ok(ProviderResponse::default()),
            || response(vec![png_payload()]),
            || response(vec![png_payload(); 6]),
        ];
        for outcome in outcomes {
            let (adapter, _) = adapter(Some("abc123"), outcome);
            let output = adapter
                .generate(&GenerationRequest::new("a cat"), false)
                .await
                .unwrap();
            assert_eq!(output.result.slots().len(), 4);
        }
    }
}
