//! Derivative naming convention.
//!
//! Every derivative key is computed from the original key, so the full set can
//! be reconstructed at delete time without tracking it anywhere:
//!
//! - `{base}_{width}w.{ext}` for each responsive width not above the source
//! - `{base}.webp` and `{base}_{width}w.webp` WebP transcodes
//! - `{base}_thumb.jpg` for uploaded videos

use showcase_core::constants::{DERIVATIVE_WIDTHS, VIDEO_THUMBNAIL_SUFFIX};
use showcase_core::models::MediaKind;

/// `(base, extension)` of a storage key; the extension keeps its case.
pub fn split_key(key: &str) -> (&str, Option<&str>) {
    let file_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    match key[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = file_start + dot;
            (&key[..split], Some(&key[split + 1..]))
        }
        _ => (key, None),
    }
}

pub fn is_webp(key: &str) -> bool {
    matches!(split_key(key).1, Some(ext) if ext.eq_ignore_ascii_case("webp"))
}

/// `{base}_{width}w.{ext}`
pub fn variant_key(original_key: &str, width: u32) -> String {
    match split_key(original_key) {
        (base, Some(ext)) => format!("{}_{}w.{}", base, width, ext),
        (base, None) => format!("{}_{}w", base, width),
    }
}

/// `{base}.webp`
pub fn webp_key(key: &str) -> String {
    format!("{}.webp", split_key(key).0)
}

/// `{base}_thumb.jpg`
pub fn thumbnail_key(original_key: &str) -> String {
    format!("{}{}", split_key(original_key).0, VIDEO_THUMBNAIL_SUFFIX)
}

/// Responsive widths generated for a source of `source_width` pixels.
pub fn planned_widths(source_width: u32) -> Vec<u32> {
    DERIVATIVE_WIDTHS
        .iter()
        .copied()
        .filter(|w| *w <= source_width)
        .collect()
}

/// Every key a derivative of `original_key` may occupy, without duplicates and
/// never including the original itself.
///
/// Covers all configured widths regardless of the source size, so deleting
/// works without knowing the original's dimensions.
pub fn derivative_keys(original_key: &str, kind: MediaKind) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut push = |key: String| {
        if key != original_key && !keys.contains(&key) {
            keys.push(key);
        }
    };

    match kind {
        MediaKind::Image => {
            for width in DERIVATIVE_WIDTHS {
                let variant = variant_key(original_key, width);
                push(webp_key(&variant));
                push(variant);
            }
            push(webp_key(original_key));
        }
        MediaKind::Video => push(thumbnail_key(original_key)),
    }

    keys
}
