//! # Core Module
//!
//! The GUI-agnostic camera engine.
//!
//! ## Modules
//! - `camera` - Driver trait and software drivers
//! - `exposure` - Auto/manual exposure and index resolution
//! - `library` - Image directory scanning, ordering and ids
//! - `filters` - The named cosmetic filters
//! - `enhance` - Tensor handling around the super-night model
//! - `studio` - Operations the camera UI triggers

pub mod camera;
pub mod enhance;
pub mod exposure;
pub mod filters;
pub mod library;
pub mod studio;

// Re-export commonly used types
pub use camera::{CameraDriver, LoggingDriver, RecordingDriver};
pub use exposure::{ExposureController, ExposureMode, ExposureSettings};
pub use filters::{FilterName, FilterRegistry};
pub use library::{ImageKind, ImageLibrary, LibraryConfig, LibraryImage, MalformedPolicy};
pub use studio::{Studio, StudioBuilder};
