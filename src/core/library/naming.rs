//! File naming rules for the image directory.
//!
//! Layout: `<id>[_SUFFIX].<ext>`
//! - `3.jpg` - capture (JPEG with Bayer data)
//! - `3.dng` - converted raw
//! - `3_SN.jpeg` - super-night output
//! - `3_VIS.jpeg` - developed DNG preview
//! - `3.JPG` - filtered output

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").expect("valid regex"));

/// Digits before the first `_` or `.`, with nothing else in between
static CAPTURE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:[_.]|$)").expect("valid regex"));

pub const SUPER_NIGHT_SUFFIX: &str = "_SN";
pub const VISUALIZED_SUFFIX: &str = "_VIS";

/// What produced a file in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Capture,
    Dng,
    SuperNight,
    Visualized,
    Filtered,
    Other,
}

impl ImageKind {
    /// Classify a file by its name
    pub fn from_path(path: &Path) -> Self {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return ImageKind::Other,
        };
        let (stem, ext) = match name.split_once('.') {
            Some((stem, ext)) => (stem, ext),
            None => (name, ""),
        };

        if stem.ends_with(SUPER_NIGHT_SUFFIX) {
            ImageKind::SuperNight
        } else if stem.ends_with(VISUALIZED_SUFFIX) {
            ImageKind::Visualized
        } else if ext.eq_ignore_ascii_case("dng") {
            ImageKind::Dng
        } else if ext == "JPG" {
            ImageKind::Filtered
        } else if ext.eq_ignore_ascii_case("jpg") {
            ImageKind::Capture
        } else {
            ImageKind::Other
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ImageKind::Dng)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImageKind::Capture => "capture",
            ImageKind::Dng => "dng",
            ImageKind::SuperNight => "super-night",
            ImageKind::Visualized => "visualized",
            ImageKind::Filtered => "filtered",
            ImageKind::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// Sort key: every digit of the file stem, read as one integer.
///
/// `None` when the stem has no digits or they overflow `u64`.
pub fn sort_key(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = NON_DIGITS.replace_all(stem, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Capture id carried by a file name, e.g. `3` for `3_SN.jpeg`
pub fn capture_token(name: &str) -> Option<u64> {
    CAPTURE_TOKEN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Name before the first `.`, which derived outputs build on
pub fn base_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    Some(name.split('.').next().unwrap_or(name))
}

pub fn capture_name(id: u64) -> String {
    format!("{}.jpg", id)
}

pub fn super_night_name(stem: &str) -> String {
    format!("{}{}.jpeg", stem, SUPER_NIGHT_SUFFIX)
}

pub fn visualized_name(stem: &str) -> String {
    format!("{}{}.jpeg", stem, VISUALIZED_SUFFIX)
}

pub fn filtered_name(stem: &str) -> String {
    format!("{}.JPG", stem)
}
