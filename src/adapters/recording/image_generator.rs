//! Recording adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use crate::cassette::format::{RecordedError, RecordedOutcome};
use crate::cassette::recorder::CassetteRecorder;
use crate::credential::Credential;
use crate::ports::image_generator::{GenerateFuture, GenerationRequest, ImageGenerator};

/// Cassette port name for ImageFX calls.
pub const PORT: &str = "imagefx";
/// Cassette method name for ImageFX calls.
pub const METHOD: &str = "generate";

/// Records every call while delegating to an inner generator.
pub struct RecordingImageGenerator {
    inner: Box<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageGenerator {
    /// Wrap `inner`, appending outcomes to `recorder`.
    pub fn new(inner: Box<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingImageGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
        credential: &Credential,
    ) -> GenerateFuture<'_> {
        let request = request.clone();
        let credential = credential.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.generate(&request, &credential).await;

            let output = match &result {
                Ok(response) => RecordedOutcome::Ok(response.clone()),
                Err(e) => RecordedOutcome::Err(RecordedError::from(e)),
            };
            match (serde_json::to_value(&request), recorder.lock()) {
                (Ok(input), Ok(mut guard)) => guard.record(PORT, METHOD, input, output),
                (Err(e), _) => {
                    tracing::warn!("Not recording call, request did not serialize: {e}");
                }
                (_, Err(e)) => {
                    tracing::warn!("Not recording call, recorder lock poisoned: {e}");
                }
            }

            result
        })
    }
}
