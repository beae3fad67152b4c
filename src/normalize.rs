//! Decoding provider payloads into exactly four RGBA images.

use base64::Engine;
use image::{Rgba, RgbaImage};
use serde::Deserialize;

use crate::debug_log::DebugLog;
use crate::error::ImageFxError;
use crate::ports::ProviderImage;

/// Number of images every successful invocation returns.
pub const OUTPUT_SLOTS: usize = 4;

/// Pixel value used for placeholder images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderFill {
    /// `(0, 0, 0, 0)`.
    #[default]
    Transparent,
    /// `(0, 0, 0, 255)`.
    Black,
}

impl PlaceholderFill {
    fn pixel(self) -> Rgba<u8> {
        match self {
            Self::Transparent => Rgba([0, 0, 0, 0]),
            Self::Black => Rgba([0, 0, 0, 255]),
        }
    }
}

/// How placeholder images are sized and filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderPolicy {
    /// Width when no decoded image sets the size.
    pub width: u32,
    /// Height when no decoded image sets the size.
    pub height: u32,
    /// Pixel value.
    pub fill: PlaceholderFill,
    /// Use the first decoded image's dimensions when there is one.
    pub match_first: bool,
}

impl Default for PlaceholderPolicy {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            fill: PlaceholderFill::Transparent,
            match_first: true,
        }
    }
}

impl PlaceholderPolicy {
    /// Build a placeholder, sized after `first` when `match_first` is set.
    #[must_use]
    pub fn placeholder(&self, first: Option<&RgbaImage>) -> RgbaImage {
        let (width, height) = match first {
            Some(image) if self.match_first => image.dimensions(),
            _ => (self.width, self.height),
        };
        RgbaImage::from_pixel(width, height, self.fill.pixel())
    }
}

/// One of the four output entries.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSlot {
    /// An image returned by the provider.
    Decoded {
        /// Pixels, always RGBA.
        image: RgbaImage,
        /// Seed reported by the provider, if any.
        seed: Option<i64>,
    },
    /// Blank padding.
    Placeholder(RgbaImage),
}

impl ImageSlot {
    /// Pixels of this entry.
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        match self {
            Self::Decoded { image, .. } | Self::Placeholder(image) => image,
        }
    }

    /// True for padding entries.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Provider seed of a decoded entry.
    #[must_use]
    pub fn seed(&self) -> Option<i64> {
        match self {
            Self::Decoded { seed, .. } => *seed,
            Self::Placeholder(_) => None,
        }
    }

    /// Convert to the host's tensor layout.
    #[must_use]
    pub fn to_tensor(&self) -> HostTensor {
        HostTensor::from_rgba(self.image())
    }
}

/// Host tensor: shape `[1, height, width, 4]`, channels scaled to `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct HostTensor {
    /// `[batch, height, width, channels]`.
    pub shape: [usize; 4],
    /// Row-major channel values.
    pub data: Vec<f32>,
}

impl HostTensor {
    /// Convert an RGBA image into a single-item batch.
    #[must_use]
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image.as_raw().iter().map(|&b| f32::from(b) / 255.0).collect();
        Self {
            shape: [1, height as usize, width as usize, 4],
            data,
        }
    }
}

/// Exactly four images: decoded ones first, placeholders after.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    slots: [ImageSlot; OUTPUT_SLOTS],
}

impl GenerationResult {
    /// The four entries in output order.
    #[must_use]
    pub fn slots(&self) -> &[ImageSlot; OUTPUT_SLOTS] {
        &self.slots
    }

    /// Take ownership of the four entries.
    #[must_use]
    pub fn into_slots(self) -> [ImageSlot; OUTPUT_SLOTS] {
        self.slots
    }

    /// How many entries are real images.
    #[must_use]
    pub fn decoded_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_placeholder()).count()
    }

    /// All four entries as host tensors.
    #[must_use]
    pub fn to_tensors(&self) -> [HostTensor; OUTPUT_SLOTS] {
        std::array::from_fn(|i| self.slots[i].to_tensor())
    }
}

/// Decode one base64 payload (optionally a `data:` URL) into RGBA pixels.
///
/// # Errors
///
/// Returns a message if the base64 or the image bytes are invalid.
pub fn decode_payload(encoded: &str) -> Result<RgbaImage, String> {
    let encoded = encoded.trim();
    let encoded = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| format!("invalid base64: {e}"))?;
    let image = image::load_from_memory(&bytes).map_err(|e| format!("invalid image: {e}"))?;
    Ok(image.to_rgba8())
}

/// Decode up to four payloads and pad the result to exactly four entries.
///
/// Payloads that fail to decode are logged and skipped; their slot is filled
/// by a placeholder after the decoded images. Payloads past the fourth are
/// ignored.
pub fn normalize(
    images: &[ProviderImage],
    policy: &PlaceholderPolicy,
    log: &mut DebugLog,
) -> GenerationResult {
    if images.len() > OUTPUT_SLOTS {
        log.info(format!(
            "Provider returned {} images, keeping the first {OUTPUT_SLOTS}",
            images.len()
        ));
    }

    let mut decoded = Vec::with_capacity(OUTPUT_SLOTS);
    for (index, raw) in images.iter().take(OUTPUT_SLOTS).enumerate() {
        match decode_payload(&raw.encoded_image) {
            Ok(image) => {
                log.info(format!(
                    "Decoded image {} ({}x{}, seed {})",
                    index + 1,
                    image.width(),
                    image.height(),
                    raw.seed.map_or_else(|| "unknown".to_string(), |s| s.to_string())
                ));
                decoded.push(ImageSlot::Decoded {
                    image,
                    seed: raw.seed,
                });
            }
            Err(message) => {
                let err = ImageFxError::Decode {
                    index: index + 1,
                    message,
                };
                log.warn(format!("{}: {err}", err.kind()));
            }
        }
    }

    let placeholder = policy.placeholder(decoded.first().map(ImageSlot::image));
    let missing = OUTPUT_SLOTS - decoded.len();
    if missing > 0 {
        log.info(format!(
            "Padding with {missing} placeholder(s) of {}x{}",
            placeholder.width(),
            placeholder.height()
        ));
    }

    let mut decoded = decoded.into_iter();
    let slots = std::array::from_fn(|_| {
        decoded.next().unwrap_or_else(|| ImageSlot::Placeholder(placeholder.clone()))
    });
    GenerationResult { slots }
}
