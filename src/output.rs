//! File naming and PNG saving for decoded images.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ImageFxError;
use crate::normalize::{GenerationResult, ImageSlot};

/// Build the file name for one decoded slot.
///
/// `<prompt-slug>-seed<seed>-<timestamp>-<slot>.png`, with `random` when the
/// provider reported no seed.
#[must_use]
pub fn slot_filename(prompt: &str, seed: Option<i64>, slot: usize, timestamp: u64) -> String {
    let slug = sanitize_for_filename(prompt, 40);
    let seed = seed.map_or_else(|| "random".to_string(), |s| s.to_string());
    format!("{slug}-seed{seed}-{timestamp}-{slot}.png")
}

/// Lowercase, collapse non-alphanumerics to single hyphens, cap at `max_len`.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            let hyphen = pending_hyphen && !result.is_empty();
            if result.len() + usize::from(hyphen) + 1 > max_len {
                break;
            }
            if hyphen {
                result.push('-');
            }
            pending_hyphen = false;
            result.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if result.is_empty() {
        "imagefx".to_string()
    } else {
        result
    }
}

/// Save every decoded slot of `result` into `dir` as PNG. Placeholders are
/// skipped.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an image cannot be
/// written.
pub fn save_decoded(
    result: &GenerationResult,
    prompt: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>, ImageFxError> {
    std::fs::create_dir_all(dir)?;
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let mut saved = Vec::new();
    for (i, slot) in result.slots().iter().enumerate() {
        if let ImageSlot::Decoded { image, seed } = slot {
            let path = dir.join(slot_filename(prompt, *seed, i + 1, timestamp));
            image
                .save_with_format(&path, image::ImageFormat::Png)
                .map_err(|e| ImageFxError::Io(std::io::Error::other(e)))?;
            saved.push(path);
        }
    }
    Ok(saved)
}
