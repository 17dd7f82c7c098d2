//! Atomic JPEG output into the library directory.

use crate::error::{DarkroomError, LibraryError, Result};
use image::{ImageFormat, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Encode `image` as JPEG at `path`.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over `path`, so a scan never sees a partial file.
pub fn write_jpeg(image: &RgbImage, path: &Path) -> Result<u64> {
    let dir = path.parent().ok_or_else(|| LibraryError::NotInLibrary {
        path: path.to_path_buf(),
    })?;

    // Dot prefix keeps the partial file out of scans
    let mut tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .map_err(|e| LibraryError::storage(dir, e))?;

    encode(image, &mut tmp, path)?;

    let bytes = tmp
        .as_file()
        .metadata()
        .map_err(|e| LibraryError::storage(tmp.path(), e))?
        .len();

    tmp.persist(path)
        .map_err(|e| LibraryError::storage(path, e.error))?;
    Ok(bytes)
}

fn encode(image: &RgbImage, tmp: &mut NamedTempFile, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(tmp.as_file_mut());
    image
        .write_to(&mut writer, ImageFormat::Jpeg)
        .map_err(|source| DarkroomError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    writer
        .flush()
        .map_err(|e| LibraryError::storage(path, e))?;
    Ok(())
}
