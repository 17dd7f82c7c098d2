//! Configuration data model.

use crate::core::camera::PreviewWindow;
use crate::core::enhance::DEFAULT_CROP_WIDTH;
use crate::core::exposure::ExposureSettings;
use crate::core::filters::{FilterName, FilterRegistry};
use crate::core::library::LibraryConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the camera reads at start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DarkroomConfig {
    /// Directory holding captures and derived images
    pub image_dir: PathBuf,
    pub exposure: ExposureSettings,
    pub library: LibraryConfig,
    pub preview: PreviewWindow,
    /// Filters offered, in menu order
    pub filters: Vec<String>,
    /// Input width of the super-night model
    pub super_night_crop_width: usize,
}

impl Default for DarkroomConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("./images"),
            exposure: ExposureSettings::default(),
            library: LibraryConfig::default(),
            preview: PreviewWindow::default(),
            filters: FilterName::ALL.iter().map(|f| f.to_string()).collect(),
            super_night_crop_width: DEFAULT_CROP_WIDTH,
        }
    }
}

impl DarkroomConfig {
    /// Reject values the components would refuse later
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.exposure
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        FilterRegistry::validate_names(&self.filters)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.preview.width == 0 || self.preview.height == 0 {
            return Err(ConfigError::Invalid(
                "preview window must have a non-zero size".to_string(),
            ));
        }
        if self.super_night_crop_width == 0 {
            return Err(ConfigError::Invalid(
                "super_night_crop_width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::library::MalformedPolicy;

    #[test]
    fn defaults_match_camera_layout() {
        let config = DarkroomConfig::default();
        assert_eq!(config.image_dir, PathBuf::from("./images"));
        assert_eq!(config.exposure.iso_step, 10);
        assert_eq!(config.exposure.shutter.len(), 27);
        assert_eq!(config.filters.len(), 26);
        assert_eq!(config.filters[0], "_1977");
        assert_eq!(config.super_night_crop_width, 2016);
        assert_eq!(config.preview, PreviewWindow::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "image_dir": "/srv/camera",
            "library": { "malformed_policy": "abort" },
            "exposure": { "shutter_denominators": [10, 100, 1000] }
        }"#;

        let config: DarkroomConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.image_dir, PathBuf::from("/srv/camera"));
        assert_eq!(config.library.malformed_policy, MalformedPolicy::Abort);
        assert_eq!(config.exposure.shutter.denominators(), &[10, 100, 1000]);
        assert_eq!(config.exposure.iso_max_index, 80);
        assert_eq!(config.filters.len(), 26);
    }

    #[test]
    fn invalid_shutter_table_fails_to_parse() {
        let json = r#"{ "exposure": { "shutter_denominators": [100, 10] } }"#;
        assert!(serde_json::from_str::<DarkroomConfig>(json).is_err());
    }

    #[test]
    fn validate_rejects_unknown_filter() {
        let config = DarkroomConfig {
            filters: vec!["moon".to_string(), "bokeh".to_string()],
            ..DarkroomConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("bokeh"));
    }

    #[test]
    fn validate_rejects_inverted_iso_range() {
        let mut config = DarkroomConfig::default();
        config.exposure.iso_min_index = 90;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
