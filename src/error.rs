//! Unified error type for the ImageFX adapter.

use thiserror::Error;

/// Errors that can occur while generating images.
#[derive(Debug, Error)]
pub enum ImageFxError {
    /// No credential source produced a token.
    #[error("No ImageFX token. Checked: {}", .sources.join(", "))]
    MissingCredential {
        /// Descriptions of every source that was consulted, in order.
        sources: Vec<String>,
    },

    /// The request could not be sent or the response could not be read
    /// (connection failure, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the bearer token.
    #[error("Authentication rejected ({status}): {body}")]
    Auth {
        /// HTTP (or embedded API) status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Any other non-success response.
    #[error("Server error ({status}): {body}")]
    Server {
        /// HTTP (or embedded API) status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body was not the expected JSON structure.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A single image payload could not be decoded.
    ///
    /// Recovered locally by substituting a placeholder; never returned from
    /// [`crate::adapter::Adapter::generate`].
    #[error("Failed to decode image {index}: {message}")]
    Decode {
        /// Position of the payload in the provider response.
        index: usize,
        /// Decoder error message.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A cassette could not be loaded, recorded, or replayed.
    #[error("Cassette error: {0}")]
    Cassette(String),
}

impl ImageFxError {
    /// Short name of the error kind, used in debug log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "MissingCredential",
            Self::Network(_) => "NetworkError",
            Self::Auth { .. } => "AuthError",
            Self::Server { .. } => "ServerError",
            Self::MalformedResponse(_) => "MalformedResponse",
            Self::Decode { .. } => "DecodeError",
            Self::Io(_) => "IoError",
            Self::Config(_) => "ConfigError",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::Cassette(_) => "CassetteError",
        }
    }
}
