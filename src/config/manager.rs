//! Loading and saving the configuration file.

use super::models::DarkroomConfig;
use crate::error::ConfigError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// `<config dir>/picam-darkroom/config.json`, or the working directory
    /// when the platform has no config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("picam-darkroom")
            .join("config.json")
    }

    /// Load and validate the configuration.
    ///
    /// A missing file yields the defaults. An unreadable, malformed or
    /// invalid file is an error.
    pub fn load(path: &Path) -> Result<DarkroomConfig, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "configuration file not found, using defaults");
            return Ok(DarkroomConfig::default());
        }

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DarkroomConfig =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Validate and write the configuration atomically
    pub fn save(config: &DarkroomConfig, path: &Path) -> Result<(), ConfigError> {
        config.validate()?;

        let write_error = |reason: String| ConfigError::Write {
            path: path.to_path_buf(),
            reason,
        };

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| write_error(e.to_string()))?;

        let json = serde_json::to_string_pretty(config).map_err(|e| write_error(e.to_string()))?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| write_error(e.to_string()))?;
        tmp.persist(path)
            .map_err(|e| write_error(e.error.to_string()))?;

        info!(path = %path.display(), "configuration saved");
        Ok(())
    }
}
