//! Service context that picks the provider implementation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::live::imagefx::ImageFxGenerator;
use crate::adapters::recording::RecordingImageGenerator;
use crate::adapters::replaying::ReplayingImageGenerator;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::HttpConfig;
use crate::error::ImageFxError;
use crate::ports::ImageGenerator;

/// Bundles the provider port used by one run.
pub struct ServiceContext {
    /// Image generator port.
    pub generator: Box<dyn ImageGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator still holds the recorder or the
    /// file cannot be written.
    pub fn finish(self) -> Result<PathBuf, ImageFxError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| ImageFxError::Cassette("recording generator still alive".into()))?
            .into_inner()
            .map_err(|e| ImageFxError::Cassette(format!("recorder lock poisoned: {e}")))?;
        recorder.finish()
    }
}

impl ServiceContext {
    /// Live context posting to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn live(http: &HttpConfig) -> Result<Self, ImageFxError> {
        let generator =
            ImageFxGenerator::new(http.endpoint.clone(), Duration::from_secs(http.timeout_secs))?;
        Ok(Self {
            generator: Box::new(generator),
        })
    }

    /// Live context whose calls are also written to a cassette under
    /// `.imagefx/cassettes/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be built.
    pub fn recording(http: &HttpConfig) -> Result<(Self, RecordingSession), ImageFxError> {
        let live = Self::live(http)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".imagefx/cassettes")
            .join(&timestamp)
            .join("imagefx.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-imagefx"),
            commit_hash(),
        )));

        let generator = RecordingImageGenerator::new(live.generator, Arc::clone(&recorder));
        Ok((
            Self {
                generator: Box::new(generator),
            },
            RecordingSession { recorder },
        ))
    }

    /// Context replaying a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ImageFxError> {
        let replayer = Arc::new(Mutex::new(load_cassette(path)?));
        Ok(Self {
            generator: Box::new(ReplayingImageGenerator::new(replayer)),
        })
    }
}

/// Current git commit, or `"unknown"`.
fn commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
