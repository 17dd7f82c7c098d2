//! # Library Module
//!
//! The on-disk image set behind the gallery strip.
//!
//! ## Rules
//! - Disk is the only source of truth; nothing is cached across calls
//!   except the set of paths the UI already shows
//! - Images are ordered by the number in their file name, not lexically
//! - Capture ids are recomputed from the directory on every capture
//! - Deleting never edits the in-memory set; a full refresh follows
//!
//! ## Example
//! ```rust,ignore
//! let mut library = ImageLibrary::new("./images", LibraryConfig::default(), null_sender());
//! let all = library.refresh(true)?; // everything, ordered
//! let new = library.refresh(false)?; // only what appeared since
//! let id = library.next_capture_id()?;
//! ```

mod naming;
mod scan;

pub use naming::{
    base_stem, capture_name, capture_token, filtered_name, sort_key, super_night_name,
    visualized_name, ImageKind,
};
pub use scan::EntryFilter;

use crate::error::LibraryError;
use crate::events::{Event, EventSender, LibraryEvent};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do with a file whose name carries no number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Leave the file out and warn once
    #[default]
    Skip,
    /// Fail the refresh with `MalformedFilename`
    Abort,
}

/// Configuration for the image library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub malformed_policy: MalformedPolicy,
    /// Whether dot files take part in scans
    pub include_hidden: bool,
}

/// One image in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryImage {
    pub path: PathBuf,
    pub sort_key: u64,
    pub kind: ImageKind,
}

impl LibraryImage {
    /// Classify a path, failing when it has no numeric sort key
    pub fn from_path(path: &Path) -> Result<Self, LibraryError> {
        let sort_key = sort_key(path).ok_or_else(|| LibraryError::MalformedFilename {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            sort_key,
            kind: ImageKind::from_path(path),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Images a refresh reported, in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Whether the UI should rebuild its list from scratch
    pub full: bool,
    /// Position of the first image in the UI list
    pub start_index: usize,
    pub images: Vec<LibraryImage>,
}

/// The image directory and the paths the UI already shows
pub struct ImageLibrary {
    root: PathBuf,
    config: LibraryConfig,
    known: HashMap<PathBuf, LibraryImage>,
    /// Malformed paths already warned about
    skipped: HashSet<PathBuf>,
    events: EventSender,
}

impl ImageLibrary {
    pub fn new(root: impl Into<PathBuf>, config: LibraryConfig, events: EventSender) -> Self {
        Self {
            root: root.into(),
            config,
            known: HashMap::new(),
            skipped: HashSet::new(),
            events,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the image directory if it does not exist yet
    pub fn ensure_root(&self) -> Result<(), LibraryError> {
        fs::create_dir_all(&self.root).map_err(|e| LibraryError::storage(&self.root, e))
    }

    /// Paths currently shown, in display order
    pub fn known_paths(&self) -> Vec<PathBuf> {
        let mut images: Vec<_> = self.known.values().cloned().collect();
        sort_images(&mut images);
        images.into_iter().map(|image| image.path).collect()
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Rescan the directory.
    ///
    /// `full` returns every image and replaces the known set; otherwise
    /// only images that were not known before are returned. Either way the
    /// known set afterwards equals what is on disk. On error the known set
    /// is left as it was.
    pub fn refresh(&mut self, full: bool) -> Result<RefreshOutcome, LibraryError> {
        let on_disk = scan::list_files(&self.root, self.filter())?;

        let mut current = HashMap::with_capacity(on_disk.len());
        for path in on_disk {
            match LibraryImage::from_path(&path) {
                Ok(image) => {
                    current.insert(path, image);
                }
                Err(error) => match self.config.malformed_policy {
                    MalformedPolicy::Abort => return Err(error),
                    MalformedPolicy::Skip => self.note_skipped(path, &error),
                },
            }
        }

        let start_index = if full { 0 } else { self.known.len() };
        let mut images: Vec<LibraryImage> = current
            .values()
            .filter(|image| full || !self.known.contains_key(&image.path))
            .cloned()
            .collect();
        sort_images(&mut images);

        self.known = current;

        debug!(full, discovered = images.len(), total = self.known.len(), "library refreshed");
        self.events.send(Event::Library(LibraryEvent::Refreshed {
            full,
            discovered: images.len(),
            total: self.known.len(),
        }));

        Ok(RefreshOutcome {
            full,
            start_index,
            images,
        })
    }

    /// `max(id) + 1` over every file name carrying a capture id, or 0.
    ///
    /// Names without an id are ignored rather than failing the scan. Only
    /// the files a refresh would list are counted: sub-directories, and dot
    /// files unless `include_hidden` is set, never reserve an id.
    pub fn next_capture_id(&self) -> Result<u64, LibraryError> {
        let files = scan::list_files(&self.root, self.filter())?;
        let next = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
            .filter_map(capture_token)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        Ok(next)
    }

    /// Resolve a file name (or a path inside the library) to its full path
    pub fn path_of(&self, name: impl AsRef<Path>) -> Result<PathBuf, LibraryError> {
        let path = self.root.join(name.as_ref());
        if path.parent() != Some(self.root.as_path()) || path.file_name().is_none() {
            return Err(LibraryError::NotInLibrary { path });
        }
        Ok(path)
    }

    /// Remove a file from disk.
    ///
    /// The known set is not touched; call `refresh(true)` afterwards.
    pub fn delete(&self, name: impl AsRef<Path>) -> Result<PathBuf, LibraryError> {
        let path = self.path_of(name)?;
        fs::remove_file(&path).map_err(|e| LibraryError::storage(&path, e))?;

        info!(path = %path.display(), "deleted image");
        self.events.send(Event::Library(LibraryEvent::Deleted { path: path.clone() }));
        Ok(path)
    }

    fn filter(&self) -> EntryFilter {
        EntryFilter::new(self.config.include_hidden)
    }

    fn note_skipped(&mut self, path: PathBuf, error: &LibraryError) {
        if self.skipped.insert(path.clone()) {
            warn!(path = %path.display(), "skipping file without a numeric name");
            self.events.send(Event::Library(LibraryEvent::Skipped {
                path,
                reason: error.to_string(),
            }));
        }
    }
}

/// Numeric order, ties broken by file name
fn sort_images(images: &mut [LibraryImage]) {
    images.sort_by(|a, b| {
        a.sort_key
            .cmp(&b.sort_key)
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{null_sender, EventChannel};
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    fn library(dir: &TempDir) -> ImageLibrary {
        ImageLibrary::new(dir.path(), LibraryConfig::default(), null_sender())
    }

    fn file_names(outcome: &RefreshOutcome) -> Vec<String> {
        outcome.images.iter().map(LibraryImage::file_name).collect()
    }

    #[test]
    fn full_refresh_orders_numerically() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "2.jpg");
        touch(&temp_dir, "10.jpg");
        touch(&temp_dir, "1.jpg");

        let outcome = library(&temp_dir).refresh(true).unwrap();

        assert_eq!(file_names(&outcome), vec!["1.jpg", "2.jpg", "10.jpg"]);
        assert!(outcome.full);
        assert_eq!(outcome.start_index, 0);
    }

    #[test]
    fn equal_keys_are_ordered_by_name() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "3_SN.jpeg");
        touch(&temp_dir, "3.jpg");
        touch(&temp_dir, "3.dng");

        let outcome = library(&temp_dir).refresh(true).unwrap();

        assert_eq!(file_names(&outcome), vec!["3.dng", "3.jpg", "3_SN.jpeg"]);
    }

    #[test]
    fn incremental_refresh_returns_only_new_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "0.jpg");
        let mut library = library(&temp_dir);
        library.refresh(true).unwrap();

        touch(&temp_dir, "11.jpg");
        touch(&temp_dir, "1.dng");
        let outcome = library.refresh(false).unwrap();

        assert_eq!(file_names(&outcome), vec!["1.dng", "11.jpg"]);
        assert_eq!(outcome.start_index, 1);
        assert_eq!(library.len(), 3);
    }

    #[test]
    fn second_incremental_refresh_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "0.jpg");
        touch(&temp_dir, "1.jpg");
        let mut library = library(&temp_dir);

        assert_eq!(library.refresh(false).unwrap().images.len(), 2);
        assert!(library.refresh(false).unwrap().images.is_empty());
    }

    #[test]
    fn next_capture_id_on_empty_directory_is_zero() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(library(&temp_dir).next_capture_id().unwrap(), 0);
    }

    #[test]
    fn next_capture_id_follows_highest_token() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "0.jpg");
        touch(&temp_dir, "3_SN.jpeg");

        assert_eq!(library(&temp_dir).next_capture_id().unwrap(), 4);
    }

    #[test]
    fn next_capture_id_ignores_unparsable_names() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "7.dng");
        touch(&temp_dir, "cover.jpg");
        touch(&temp_dir, "99abc.jpg");

        assert_eq!(library(&temp_dir).next_capture_id().unwrap(), 8);
    }

    #[test]
    fn next_capture_id_sees_external_deletions() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "0.jpg");
        let five = touch(&temp_dir, "5.jpg");
        let library = library(&temp_dir);
        assert_eq!(library.next_capture_id().unwrap(), 6);

        fs::remove_file(five).unwrap();

        assert_eq!(library.next_capture_id().unwrap(), 1);
    }

    #[test]
    fn malformed_names_are_skipped_by_default() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "1.jpg");
        touch(&temp_dir, "cover.jpg");
        let (sender, receiver) = EventChannel::new();
        let mut library = ImageLibrary::new(temp_dir.path(), LibraryConfig::default(), sender);

        let outcome = library.refresh(true).unwrap();
        library.refresh(true).unwrap();

        assert_eq!(file_names(&outcome), vec!["1.jpg"]);
        let skipped = receiver
            .drain()
            .into_iter()
            .filter(|e| matches!(e, Event::Library(LibraryEvent::Skipped { .. })))
            .count();
        assert_eq!(skipped, 1, "a skipped file is reported once");
    }

    #[test]
    fn malformed_names_abort_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "1.jpg");
        let config = LibraryConfig {
            malformed_policy: MalformedPolicy::Abort,
            ..Default::default()
        };
        let mut library = ImageLibrary::new(temp_dir.path(), config, null_sender());
        library.refresh(true).unwrap();

        touch(&temp_dir, "cover.jpg");
        touch(&temp_dir, "2.jpg");
        let result = library.refresh(false);

        assert!(matches!(result, Err(LibraryError::MalformedFilename { .. })));
        assert_eq!(library.known_paths(), vec![temp_dir.path().join("1.jpg")]);
    }

    #[test]
    fn deleted_file_disappears_after_full_refresh() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "1.jpg");
        touch(&temp_dir, "2.jpg");
        let mut library = library(&temp_dir);
        library.refresh(true).unwrap();

        library.delete("1.jpg").unwrap();
        assert_eq!(library.len(), 2, "delete leaves the known set alone");

        let outcome = library.refresh(true).unwrap();
        assert_eq!(file_names(&outcome), vec!["2.jpg"]);
    }

    #[test]
    fn deleted_file_is_not_rediscovered_incrementally() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "1.jpg");
        touch(&temp_dir, "2.jpg");
        let mut library = library(&temp_dir);
        library.refresh(true).unwrap();

        library.delete("2.jpg").unwrap();
        let outcome = library.refresh(false).unwrap();

        assert!(outcome.images.is_empty());
        assert_eq!(library.known_paths(), vec![temp_dir.path().join("1.jpg")]);
    }

    #[test]
    fn delete_missing_file_is_a_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let error = library(&temp_dir).delete("9.jpg").unwrap_err();
        assert!(error.is_storage());
    }

    #[test]
    fn delete_refuses_paths_outside_the_library() {
        let temp_dir = TempDir::new().unwrap();
        let library = library(&temp_dir);

        assert!(matches!(
            library.delete("../1.jpg"),
            Err(LibraryError::NotInLibrary { .. })
        ));
        assert!(matches!(
            library.delete("/etc/hostname"),
            Err(LibraryError::NotInLibrary { .. })
        ));
    }

    #[test]
    fn refresh_of_missing_directory_fails() {
        let mut library =
            ImageLibrary::new("/nonexistent/images", LibraryConfig::default(), null_sender());
        let error = library.refresh(true).unwrap_err();
        assert!(matches!(error, LibraryError::DirectoryNotFound { .. }));
    }

    #[test]
    fn ensure_root_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("images");
        let mut library = ImageLibrary::new(&root, LibraryConfig::default(), null_sender());

        library.ensure_root().unwrap();

        assert!(library.refresh(true).unwrap().images.is_empty());
    }
}
