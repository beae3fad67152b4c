//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::normalize::{PlaceholderFill, PlaceholderPolicy};

/// Default ImageFX endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://aisandbox-pa.googleapis.com/v1:runImageFx";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Credential overrides.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Default generation parameters (used when CLI flags are absent).
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Placeholder image settings.
    #[serde(default)]
    pub placeholder: PlaceholderConfig,

    /// Where the CLI writes decoded images.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Credential overrides.
#[derive(Debug, Default, Deserialize)]
pub struct AuthConfig {
    /// Literal token, consulted after the environment variable.
    pub token: Option<String>,
    /// Token file location, replacing the default next to the executable.
    pub token_file: Option<PathBuf>,
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default model name.
    pub model: String,
    /// Default aspect ratio.
    pub aspect_ratio: String,
    /// Default number of candidates to request.
    pub image_count: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: "IMAGEN_3_1".to_string(),
            aspect_ratio: "LANDSCAPE".to_string(),
            image_count: 4,
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Endpoint receiving the `runImageFx` POST.
    pub endpoint: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Placeholder image settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Width used when no decoded image sets the size.
    pub width: u32,
    /// Height used when no decoded image sets the size.
    pub height: u32,
    /// `"transparent"` or `"black"`.
    pub fill: PlaceholderFill,
    /// Size placeholders like the first decoded image.
    pub match_first: bool,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        let policy = PlaceholderPolicy::default();
        Self {
            width: policy.width,
            height: policy.height,
            fill: policy.fill,
            match_first: policy.match_first,
        }
    }
}

impl PlaceholderConfig {
    /// Convert into the normalizer's policy.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn to_policy(&self) -> Result<PlaceholderPolicy, String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Placeholder size must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(PlaceholderPolicy {
            width: self.width,
            height: self.height,
            fill: self.fill,
            match_first: self.match_first,
        })
    }
}

/// Output settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for saved PNGs.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("imagefx_outputs"),
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `IMAGEFX_CONFIG` environment variable
/// 3. `~/.config/imagefx/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("IMAGEFX_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/imagefx/config.toml")
    } else {
        PathBuf::from("imagefx.toml")
    }
}
