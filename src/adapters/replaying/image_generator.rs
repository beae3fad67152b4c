//! Replaying adapter for the `ImageGenerator` port.

use std::sync::{Arc, Mutex};

use crate::adapters::recording::image_generator::{METHOD, PORT};
use crate::cassette::format::RecordedOutcome;
use crate::cassette::replayer::CassetteReplayer;
use crate::credential::Credential;
use crate::error::ImageFxError;
use crate::ports::image_generator::{GenerateFuture, GenerationRequest, ImageGenerator};

/// Serves recorded provider outcomes; never touches the network.
pub struct ReplayingImageGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingImageGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageGenerator for ReplayingImageGenerator {
    fn generate(
        &self,
        _request: &GenerationRequest,
        _credential: &Credential,
    ) -> GenerateFuture<'_> {
        let next = self
            .replayer
            .lock()
            .map_err(|e| format!("replayer lock poisoned: {e}"))
            .and_then(|mut guard| guard.next_interaction(PORT, METHOD));

        Box::pin(async move {
            match next.map_err(ImageFxError::Cassette)?.output {
                RecordedOutcome::Ok(response) => Ok(response),
                RecordedOutcome::Err(recorded) => Err(recorded.into()),
            }
        })
    }
}
