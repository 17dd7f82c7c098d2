//! External raw collaborators.

use crate::error::RawError;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Writes a DNG next to a JPEG that carries Bayer data
pub trait DngConverter: Send {
    /// Convert `jpeg_with_bayer`, returning the path of the new DNG
    fn convert(&self, jpeg_with_bayer: &Path) -> Result<PathBuf, RawError>;
}

/// Demosaics a DNG with camera white balance
pub trait RawDeveloper: Send {
    /// Develop at half resolution
    fn develop_half_size(&self, dng: &Path) -> Result<RgbImage, RawError>;
}
