//! # Studio Module
//!
//! Wires the exposure controller, the image library and the image
//! processing collaborators into the operations the camera UI triggers.
//!
//! ## Operations
//! 1. **Capture** - JPEG with Bayer data under the next free id, then DNG
//! 2. **Develop** - half-size visualisation or super-night enhancement of a DNG
//! 3. **Filter** - previews of every enabled filter, or a full-size save
//! 4. **Housekeeping** - delete, refresh, live preview
//!
//! Derived images are written atomically and followed by a full refresh.

mod output;
mod raw;

pub use output::write_jpeg;
pub use raw::{DngConverter, RawDeveloper};

use crate::core::camera::{CameraDriver, CaptureFormat, LoggingDriver, PreviewWindow};
use crate::core::enhance::{self, EnhancementModel, RawPreprocessor, DEFAULT_CROP_WIDTH};
use crate::core::exposure::{ExposureController, ExposureSettings};
use crate::core::filters::{FilterName, FilterPreview, FilterRegistry};
use crate::core::library::{
    base_stem, capture_name, filtered_name, super_night_name, visualized_name, ImageKind,
    ImageLibrary, LibraryConfig, RefreshOutcome,
};
use crate::error::{DarkroomError, EnhanceError, LibraryError, RawError, Result};
use crate::events::{null_sender, Event, EventSender, StudioEvent};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Files produced by one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub id: u64,
    pub jpeg: PathBuf,
    pub dng: PathBuf,
    pub bytes_written: u64,
}

/// Builder for a [`Studio`]
pub struct StudioBuilder {
    image_dir: PathBuf,
    driver: Option<Box<dyn CameraDriver>>,
    exposure: ExposureSettings,
    library: LibraryConfig,
    filters: Option<Vec<String>>,
    preview_window: PreviewWindow,
    crop_width: usize,
    converter: Option<Box<dyn DngConverter>>,
    developer: Option<Box<dyn RawDeveloper>>,
    enhancer: Option<(Box<dyn RawPreprocessor>, Box<dyn EnhancementModel>)>,
    events: Option<EventSender>,
}

impl StudioBuilder {
    pub fn new() -> Self {
        Self {
            image_dir: PathBuf::from("./images"),
            driver: None,
            exposure: ExposureSettings::default(),
            library: LibraryConfig::default(),
            filters: None,
            preview_window: PreviewWindow::default(),
            crop_width: DEFAULT_CROP_WIDTH,
            converter: None,
            developer: None,
            enhancer: None,
            events: None,
        }
    }

    /// Directory holding every capture and derived image
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Camera driver; defaults to the logging driver
    pub fn driver(mut self, driver: Box<dyn CameraDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn exposure_settings(mut self, settings: ExposureSettings) -> Self {
        self.exposure = settings;
        self
    }

    pub fn library_config(mut self, config: LibraryConfig) -> Self {
        self.library = config;
        self
    }

    /// Restrict and order the filters offered; all 26 by default
    pub fn filters(mut self, names: Vec<String>) -> Self {
        self.filters = Some(names);
        self
    }

    pub fn preview_window(mut self, window: PreviewWindow) -> Self {
        self.preview_window = window;
        self
    }

    /// Width the enhancement input is cropped to
    pub fn crop_width(mut self, width: usize) -> Self {
        self.crop_width = width;
        self
    }

    pub fn converter(mut self, converter: Box<dyn DngConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn developer(mut self, developer: Box<dyn RawDeveloper>) -> Self {
        self.developer = Some(developer);
        self
    }

    pub fn enhancer(
        mut self,
        preprocessor: Box<dyn RawPreprocessor>,
        model: Box<dyn EnhancementModel>,
    ) -> Self {
        self.enhancer = Some((preprocessor, model));
        self
    }

    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Validate settings and filter names, then reset the driver's gain
    pub fn build(self) -> Result<Studio> {
        let events = self.events.unwrap_or_else(null_sender);

        let filters = match &self.filters {
            Some(names) => FilterRegistry::with_enabled(names)?,
            None => FilterRegistry::new()?,
        };

        let driver = self
            .driver
            .unwrap_or_else(|| Box::new(LoggingDriver::new()));
        let exposure = ExposureController::new(driver, self.exposure, events.clone())?;
        let library = ImageLibrary::new(self.image_dir, self.library, events.clone());

        Ok(Studio {
            exposure,
            library,
            filters,
            preview_window: self.preview_window,
            crop_width: self.crop_width,
            converter: self.converter,
            developer: self.developer,
            enhancer: self.enhancer,
            events,
        })
    }
}

impl Default for StudioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The camera application's core
pub struct Studio {
    exposure: ExposureController,
    library: ImageLibrary,
    filters: FilterRegistry,
    preview_window: PreviewWindow,
    crop_width: usize,
    converter: Option<Box<dyn DngConverter>>,
    developer: Option<Box<dyn RawDeveloper>>,
    enhancer: Option<(Box<dyn RawPreprocessor>, Box<dyn EnhancementModel>)>,
    events: EventSender,
}

impl Studio {
    pub fn builder() -> StudioBuilder {
        StudioBuilder::new()
    }

    pub fn exposure(&self) -> &ExposureController {
        &self.exposure
    }

    pub fn exposure_mut(&mut self) -> &mut ExposureController {
        &mut self.exposure
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Rescan the image directory
    pub fn refresh(&mut self, full: bool) -> Result<RefreshOutcome> {
        Ok(self.library.refresh(full)?)
    }

    /// Capture a still and convert it to DNG.
    ///
    /// The id is recomputed from disk, so two callers racing here may pick
    /// the same id. The library is not refreshed; the UI follows up with an
    /// incremental refresh.
    ///
    /// Once the driver has written the JPEG, exposure is re-applied whatever
    /// the conversion does. A failed conversion removes the JPEG again.
    pub fn capture(&mut self) -> Result<CaptureOutcome> {
        let result = self.capture_inner();
        self.report(result)
    }

    fn capture_inner(&mut self) -> Result<CaptureOutcome> {
        self.library.ensure_root()?;
        let id = self.library.next_capture_id()?;
        let jpeg = self.library.root().join(capture_name(id));

        info!(id, path = %jpeg.display(), "capturing");
        self.events.send(Event::Studio(StudioEvent::CaptureStarted {
            id,
            path: jpeg.clone(),
        }));

        let bytes_written = self.exposure.capture(&jpeg, CaptureFormat::JpegWithBayer)?;
        self.events.send(Event::Studio(StudioEvent::Captured {
            path: jpeg.clone(),
            bytes_written,
        }));

        let converted = self.convert(&jpeg);

        // Capturing resets the sensor mode; restore the user's exposure
        let restored = self.exposure.apply();

        let dng = match converted {
            Ok(dng) => dng,
            Err(error) => {
                if let Err(e) = &restored {
                    warn!("exposure not restored after failed conversion: {}", e);
                }
                self.discard_capture(&jpeg, &error)?;
                return Err(error);
            }
        };
        restored.map_err(|e| follow_up(&jpeg, e.into()))?;

        Ok(CaptureOutcome {
            id,
            jpeg,
            dng,
            bytes_written,
        })
    }

    fn convert(&self, jpeg: &Path) -> Result<PathBuf> {
        let converter = self
            .converter
            .as_ref()
            .ok_or(RawError::ConverterUnavailable)?;
        let dng = converter.convert(jpeg)?;
        self.events.send(Event::Studio(StudioEvent::Converted {
            dng_path: dng.clone(),
        }));
        Ok(dng)
    }

    /// Remove a capture whose conversion failed so ids and listings stay put
    fn discard_capture(&self, jpeg: &Path, cause: &DarkroomError) -> Result<()> {
        match std::fs::remove_file(jpeg) {
            Ok(()) => {
                info!(path = %jpeg.display(), "removed unconverted capture");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DarkroomError::OrphanedCapture {
                path: jpeg.to_path_buf(),
                reason: cause.to_string(),
                source: LibraryError::storage(jpeg, e),
            }),
        }
    }

    /// Delete an image and rebuild the list from disk.
    ///
    /// A failed rescan after a successful delete is `FollowUp`.
    pub fn delete(&mut self, name: &str) -> Result<RefreshOutcome> {
        let result = self.delete_inner(name);
        self.report(result)
    }

    fn delete_inner(&mut self, name: &str) -> Result<RefreshOutcome> {
        let path = self.library.delete(name)?;
        self.library
            .refresh(true)
            .map_err(|e| follow_up(&path, e.into()))
    }

    /// Develop a DNG at half size and save it as `<stem>_VIS.jpeg`
    pub fn visualize_dng(&mut self, name: &str) -> Result<PathBuf> {
        let result = self.visualize_inner(name);
        self.report(result)
    }

    fn visualize_inner(&mut self, name: &str) -> Result<PathBuf> {
        let source = self.raw_source(name)?;
        let developer = self
            .developer
            .as_ref()
            .ok_or(RawError::DeveloperUnavailable)?;

        let image = developer.develop_half_size(&source)?;
        self.save_derived(&image, &source, visualized_name, ImageKind::Visualized)
    }

    /// Run the low-light model on a DNG and save it as `<stem>_SN.jpeg`
    pub fn super_night(&mut self, name: &str) -> Result<PathBuf> {
        let result = self.super_night_inner(name);
        self.report(result)
    }

    fn super_night_inner(&mut self, name: &str) -> Result<PathBuf> {
        let source = self.raw_source(name)?;
        let (preprocessor, model) = self
            .enhancer
            .as_ref()
            .ok_or(EnhanceError::ModelUnavailable)?;

        let image = enhance::enhance(&source, &**preprocessor, &**model, self.crop_width)?;
        self.save_derived(&image, &source, super_night_name, ImageKind::SuperNight)
    }

    /// Small previews of every enabled filter applied to `name`
    pub fn filter_previews(&self, name: &str) -> Result<Vec<FilterPreview>> {
        let source = self.library.path_of(name)?;
        let image = open_image(&source)?;
        Ok(self.filters.preview_all(&image)?)
    }

    /// Apply `filter` to the full-size image and save it as `<stem>.JPG`
    pub fn save_filter(&mut self, name: &str, filter: FilterName) -> Result<PathBuf> {
        let result = self.save_filter_inner(name, filter);
        self.report(result)
    }

    fn save_filter_inner(&mut self, name: &str, filter: FilterName) -> Result<PathBuf> {
        let source = self.library.path_of(name)?;
        let image = open_image(&source)?.to_rgb8();
        let filtered = self.filters.apply(&image, filter)?;
        self.save_derived(&filtered, &source, filtered_name, ImageKind::Filtered)
    }

    /// Start the live preview and push the current exposure
    pub fn show_preview(&mut self) -> Result<()> {
        let result = self
            .exposure
            .start_preview(self.preview_window)
            .map_err(DarkroomError::from)
            .and_then(|_| self.exposure.apply().map_err(DarkroomError::from));
        if result.is_ok() {
            self.events.send(Event::Studio(StudioEvent::PreviewStarted));
        }
        self.report(result)
    }

    pub fn hide_preview(&mut self) -> Result<()> {
        let result = self.exposure.stop_preview().map_err(DarkroomError::from);
        if result.is_ok() {
            self.events.send(Event::Studio(StudioEvent::PreviewStopped));
        }
        self.report(result)
    }

    fn raw_source(&self, name: &str) -> Result<PathBuf> {
        let path = self.library.path_of(name)?;
        if !ImageKind::from_path(&path).is_raw() {
            return Err(DarkroomError::NotRaw { path });
        }
        Ok(path)
    }

    fn save_derived(
        &mut self,
        image: &RgbImage,
        source: &Path,
        name_for: fn(&str) -> String,
        kind: ImageKind,
    ) -> Result<PathBuf> {
        let stem = base_stem(source).ok_or_else(|| DarkroomError::NotRaw {
            path: source.to_path_buf(),
        })?;
        let path = self.library.root().join(name_for(stem));

        write_jpeg(image, &path)?;
        info!(path = %path.display(), %kind, "wrote image");
        self.events.send(Event::Studio(StudioEvent::OutputWritten {
            path: path.clone(),
            kind,
        }));

        self.library
            .refresh(true)
            .map_err(|e| follow_up(&path, e.into()))?;
        Ok(path)
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(error) = &result {
            warn!("{}", error);
            self.events.send(Event::Studio(StudioEvent::Error {
                message: error.to_string(),
            }));
        }
        result
    }
}

fn follow_up(path: &Path, source: DarkroomError) -> DarkroomError {
    DarkroomError::FollowUp {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).map_err(|source| DarkroomError::Image {
        path: path.to_path_buf(),
        source,
    })
}
