//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ImageFxError;
use crate::ports::ProviderResponse;

/// A recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Session name.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Calls in the order they happened.
    pub interactions: Vec<Interaction>,
}

/// One recorded provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the session.
    pub seq: u64,
    /// Port name, e.g. `imagefx`.
    pub port: String,
    /// Method name, e.g. `generate`.
    pub method: String,
    /// Serialized request (never the credential).
    pub input: serde_json::Value,
    /// What the provider produced.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub output: RecordedOutcome,
}

/// Result of a recorded call, written as `Ok:` / `Err:` in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordedOutcome {
    /// Raw payloads.
    Ok(ProviderResponse),
    /// A provider failure.
    Err(RecordedError),
}

/// A provider failure in serializable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// [`ImageFxError::kind`] of the original error.
    pub kind: String,
    /// HTTP status, for auth and server errors.
    #[serde(default)]
    pub status: Option<u16>,
    /// Body or message.
    pub message: String,
}

impl From<&ImageFxError> for RecordedError {
    fn from(error: &ImageFxError) -> Self {
        let (status, message) = match error {
            ImageFxError::Auth { status, body } | ImageFxError::Server { status, body } => {
                (Some(*status), body.clone())
            }
            ImageFxError::MalformedResponse(message) => (None, message.clone()),
            other => (None, other.to_string()),
        };
        Self {
            kind: error.kind().to_string(),
            status,
            message,
        }
    }
}

impl From<RecordedError> for ImageFxError {
    fn from(recorded: RecordedError) -> Self {
        match (recorded.kind.as_str(), recorded.status) {
            ("AuthError", Some(status)) => Self::Auth {
                status,
                body: recorded.message,
            },
            ("ServerError", Some(status)) => Self::Server {
                status,
                body: recorded.message,
            },
            ("MalformedResponse", _) => Self::MalformedResponse(recorded.message),
            // reqwest errors cannot be rebuilt; surface them as replay failures
            (kind, _) => Self::Cassette(format!("replayed {kind}: {}", recorded.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_survives_recording() {
        let original = ImageFxError::Auth {
            status: 401,
            body: "expired".into(),
        };
        let replayed = ImageFxError::from(RecordedError::from(&original));
        assert!(
            matches!(replayed, ImageFxError::Auth { status: 401, ref body } if body == "expired")
        );
    }

    #[test]
    fn unrebuildable_errors_become_cassette_errors() {
        let recorded = RecordedError {
            kind: "NetworkError".into(),
            status: None,
            message: "timed out".into(),
        };
        let replayed = ImageFxError::from(recorded);
        assert_eq!(
            replayed.to_string(),
            "Cassette error: replayed NetworkError: timed out"
        );
    }

    #[test]
    fn outcome_is_written_as_ok_err_map() {
        let interaction = Interaction {
            seq: 0,
            port: "imagefx".into(),
            method: "generate".into(),
            input: serde_json::json!({"prompt": "a cat"}),
            output: RecordedOutcome::Ok(ProviderResponse::default()),
        };
        let yaml = serde_yaml::to_string(&interaction).unwrap();
        assert!(yaml.contains("Ok:"), "unexpected yaml: {yaml}");
        assert!(!yaml.contains("!Ok"), "unexpected yaml: {yaml}");

        let reloaded: Interaction = serde_yaml::from_str(&yaml).unwrap();
        assert!(matches!(reloaded.output, RecordedOutcome::Ok(ref r) if r.images.is_empty()));
    }

    #[test]
    fn hand_written_err_outcome_loads() {
        let yaml = "\
seq: 0
port: imagefx
method: generate
input: {}
output:
  Err:
    kind: ServerError
    status: 500
    message: boom
";
        let interaction: Interaction = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            interaction.output,
            RecordedOutcome::Err(RecordedError {
                status: Some(500),
                ..
            })
        ));
    }
}
