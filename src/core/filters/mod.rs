//! # Filters Module
//!
//! The 26 named cosmetic filters.
//!
//! Names map to presets through a fixed table that is checked when the
//! registry is built, so a typo in configuration fails at start-up with
//! `UnknownFilter` instead of at the moment a user taps a thumbnail.

mod presets;

pub use presets::{Op, Overlay, Preset, PRESETS};

use crate::error::FilterError;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Size previews are rendered at before filtering
pub const PREVIEW_WIDTH: u32 = 320;
pub const PREVIEW_HEIGHT: u32 = 240;

/// Every filter the camera offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterName {
    #[serde(rename = "_1977")]
    Filter1977,
    Aden,
    Brannan,
    Brooklyn,
    Clarendon,
    Earlybird,
    Gingham,
    Hudson,
    Inkwell,
    Kelvin,
    Lark,
    Lofi,
    Maven,
    Mayfair,
    Moon,
    Nashville,
    Perpetua,
    Reyes,
    Rise,
    Slumber,
    Stinson,
    Toaster,
    Valencia,
    Walden,
    Willow,
    Xpro2,
}

impl FilterName {
    /// All filters in menu order
    pub const ALL: [FilterName; 26] = [
        FilterName::Filter1977,
        FilterName::Aden,
        FilterName::Brannan,
        FilterName::Brooklyn,
        FilterName::Clarendon,
        FilterName::Earlybird,
        FilterName::Gingham,
        FilterName::Hudson,
        FilterName::Inkwell,
        FilterName::Kelvin,
        FilterName::Lark,
        FilterName::Lofi,
        FilterName::Maven,
        FilterName::Mayfair,
        FilterName::Moon,
        FilterName::Nashville,
        FilterName::Perpetua,
        FilterName::Reyes,
        FilterName::Rise,
        FilterName::Slumber,
        FilterName::Stinson,
        FilterName::Toaster,
        FilterName::Valencia,
        FilterName::Walden,
        FilterName::Willow,
        FilterName::Xpro2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterName::Filter1977 => "_1977",
            FilterName::Aden => "aden",
            FilterName::Brannan => "brannan",
            FilterName::Brooklyn => "brooklyn",
            FilterName::Clarendon => "clarendon",
            FilterName::Earlybird => "earlybird",
            FilterName::Gingham => "gingham",
            FilterName::Hudson => "hudson",
            FilterName::Inkwell => "inkwell",
            FilterName::Kelvin => "kelvin",
            FilterName::Lark => "lark",
            FilterName::Lofi => "lofi",
            FilterName::Maven => "maven",
            FilterName::Mayfair => "mayfair",
            FilterName::Moon => "moon",
            FilterName::Nashville => "nashville",
            FilterName::Perpetua => "perpetua",
            FilterName::Reyes => "reyes",
            FilterName::Rise => "rise",
            FilterName::Slumber => "slumber",
            FilterName::Stinson => "stinson",
            FilterName::Toaster => "toaster",
            FilterName::Valencia => "valencia",
            FilterName::Walden => "walden",
            FilterName::Willow => "willow",
            FilterName::Xpro2 => "xpro2",
        }
    }
}

impl FromStr for FilterName {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| FilterError::UnknownFilter {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A filtered preview
#[derive(Debug, Clone)]
pub struct FilterPreview {
    pub name: FilterName,
    pub image: RgbImage,
}

/// Name to preset mapping, checked at construction
pub struct FilterRegistry {
    presets: HashMap<FilterName, &'static Preset>,
    enabled: Vec<FilterName>,
}

impl FilterRegistry {
    /// Registry with every filter enabled
    pub fn new() -> Result<Self, FilterError> {
        let presets: HashMap<_, _> = PRESETS.iter().map(|(name, preset)| (*name, preset)).collect();

        if let Some(missing) = FilterName::ALL.iter().find(|name| !presets.contains_key(*name)) {
            return Err(FilterError::MissingPreset {
                name: missing.to_string(),
            });
        }

        Ok(Self {
            presets,
            enabled: FilterName::ALL.to_vec(),
        })
    }

    /// Registry limited to configured names, in the order given.
    pub fn with_enabled<S: AsRef<str>>(names: &[S]) -> Result<Self, FilterError> {
        let mut registry = Self::new()?;
        registry.enabled = Self::validate_names(names)?;
        Ok(registry)
    }

    /// Parse configured names, failing on the first one outside the enumerated set.
    pub fn validate_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<FilterName>, FilterError> {
        names.iter().map(|name| name.as_ref().parse()).collect()
    }

    pub fn enabled(&self) -> &[FilterName] {
        &self.enabled
    }

    /// Apply one filter
    pub fn apply(&self, image: &RgbImage, name: FilterName) -> Result<RgbImage, FilterError> {
        let preset = self
            .presets
            .get(&name)
            .ok_or_else(|| FilterError::MissingPreset {
                name: name.to_string(),
            })?;
        Ok(preset.apply(image))
    }

    /// Apply a filter given by its string name
    pub fn apply_named(&self, image: &RgbImage, name: &str) -> Result<RgbImage, FilterError> {
        self.apply(image, name.parse()?)
    }

    /// Shrink to preview size and render every enabled filter
    pub fn preview_all(&self, image: &DynamicImage) -> Result<Vec<FilterPreview>, FilterError> {
        let small = image
            .resize_exact(PREVIEW_WIDTH, PREVIEW_HEIGHT, FilterType::Triangle)
            .to_rgb8();

        self.enabled
            .iter()
            .map(|&name| {
                Ok(FilterPreview {
                    name,
                    image: self.apply(&small, name)?,
                })
            })
            .collect()
    }
}
