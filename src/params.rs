//! Parameter translation between host inputs and the ImageFX wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Largest `candidatesCount` the adapter will ask for.
pub const MAX_IMAGE_COUNT: u32 = 10;

/// Aspect ratios ImageFX can render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AspectRatio {
    /// 16:9.
    #[default]
    Landscape,
    /// 9:16.
    Portrait,
    /// 1:1.
    Square,
    /// 4:3.
    LandscapeFourThree,
    /// 3:4.
    PortraitThreeFour,
}

impl AspectRatio {
    /// Every accepted value, in display order.
    pub const ALL: [Self; 5] = [
        Self::Landscape,
        Self::Portrait,
        Self::Square,
        Self::LandscapeFourThree,
        Self::PortraitThreeFour,
    ];

    /// Name used on the command line and in config files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Landscape => "LANDSCAPE",
            Self::Portrait => "PORTRAIT",
            Self::Square => "SQUARE",
            Self::LandscapeFourThree => "LANDSCAPE_FOUR_THREE",
            Self::PortraitThreeFour => "PORTRAIT_THREE_FOUR",
        }
    }

    /// Value sent as the request's `aspectRatio` field.
    #[must_use]
    pub fn wire_name(self) -> String {
        format!("IMAGE_ASPECT_RATIO_{}", self.name())
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("IMAGE_ASPECT_RATIO_").unwrap_or(&upper);
        match name {
            "LANDSCAPE" | "16:9" => Ok(Self::Landscape),
            "PORTRAIT" | "9:16" => Ok(Self::Portrait),
            "SQUARE" | "1:1" => Ok(Self::Square),
            "LANDSCAPE_FOUR_THREE" | "4:3" => Ok(Self::LandscapeFourThree),
            "PORTRAIT_THREE_FOUR" | "3:4" => Ok(Self::PortraitThreeFour),
            _ => {
                let valid: Vec<_> = Self::ALL.iter().map(|r| r.name()).collect();
                Err(format!("Unsupported aspect ratio '{s}'. Valid: {valid:?}"))
            }
        }
    }
}

/// Translate a host seed into the request seed.
///
/// The host uses `-1` (or any non-positive value) for "random"; only positive
/// seeds are forwarded.
///
/// # Errors
///
/// Returns an error if a positive seed does not fit in 32 bits.
pub fn seed_from_host(seed: i64) -> Result<Option<u32>, String> {
    if seed <= 0 {
        return Ok(None);
    }
    u32::try_from(seed)
        .map(Some)
        .map_err(|_| format!("Seed {seed} is out of range. Max: {}", u32::MAX))
}

/// Validate the number of candidates to request.
///
/// # Errors
///
/// Returns an error if the count is outside `1..=10`.
pub fn validate_image_count(count: u32) -> Result<(), String> {
    if (1..=MAX_IMAGE_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(format!("Unsupported image count {count}. Valid: 1-{MAX_IMAGE_COUNT}"))
    }
}
