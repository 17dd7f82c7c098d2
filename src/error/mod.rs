//! # Error Module
//!
//! Error types for the camera core.
//!
//! ## Design Principles
//! - **Never panic** on user data or driver responses - return errors instead
//! - **Include context** - paths, indices, which control was touched
//! - **No silent recovery** - every failure reaches the caller (the UI layer)
//! - **State is preserved** - a failed operation leaves components untouched

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DarkroomError {
    #[error("Exposure error: {0}")]
    Exposure(#[from] ExposureError),

    #[error("Camera driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Image library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Raw processing error: {0}")]
    Raw(#[from] RawError),

    #[error("Enhancement error: {0}")]
    Enhance(#[from] EnhanceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{path} is not a DNG file")]
    NotRaw { path: PathBuf },

    #[error("Failed to process image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The file operation took effect; a later step did not
    #[error("{path} changed on disk, but a follow-up step failed: {source}")]
    FollowUp {
        path: PathBuf,
        #[source]
        source: Box<DarkroomError>,
    },

    #[error("Capture {path} failed ({reason}) and the partial file could not be removed: {source}")]
    OrphanedCapture {
        path: PathBuf,
        reason: String,
        #[source]
        source: LibraryError,
    },
}

/// Which exposure control an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureControl {
    Iso,
    Shutter,
}

impl fmt::Display for ExposureControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExposureControl::Iso => write!(f, "ISO"),
            ExposureControl::Shutter => write!(f, "shutter"),
        }
    }
}

/// Errors raised by the exposure controller
#[derive(Error, Debug)]
pub enum ExposureError {
    #[error("{control} index {index} is outside {min}..={max}")]
    OutOfRange {
        control: ExposureControl,
        index: i64,
        min: i64,
        max: i64,
    },

    #[error("{control} cannot be changed while auto exposure is active")]
    ControlsLocked { control: ExposureControl },

    #[error("Invalid shutter table: {reason}")]
    InvalidShutterTable { reason: String },

    #[error("Invalid ISO range: min index {min} must be <= max index {max} and step must be positive")]
    InvalidIsoRange { min: u32, max: u32 },

    #[error("ISO index {index} times step {step} does not fit the driver's range")]
    IsoOverflow { index: u32, step: u32 },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Errors reported by a camera driver
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("{parameter} is not supported by this firmware. Are the userland libraries up to date?")]
    Unsupported { parameter: String },

    #[error("Driver rejected {parameter} (status {status})")]
    Rejected { parameter: String, status: i32 },

    #[error("Capture to {path} failed: {reason}")]
    Capture { path: PathBuf, reason: String },

    #[error("Preview failed: {reason}")]
    Preview { reason: String },
}

impl DriverError {
    /// Status code firmware returns for parameters it does not know.
    pub const STATUS_UNSUPPORTED: i32 = 4;

    /// Map a raw firmware status code to a result.
    pub fn check_status(parameter: &str, status: i32) -> std::result::Result<(), DriverError> {
        match status {
            0 => Ok(()),
            Self::STATUS_UNSUPPORTED => Err(DriverError::Unsupported {
                parameter: parameter.to_string(),
            }),
            _ => Err(DriverError::Rejected {
                parameter: parameter.to_string(),
                status,
            }),
        }
    }
}

/// Errors from the on-disk image library
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Image directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Storage operation failed on {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File name has no numeric sort key: {path}")]
    MalformedFilename { path: PathBuf },

    #[error("{path} is outside the image library")]
    NotInLibrary { path: PathBuf },
}

impl LibraryError {
    /// Classify an I/O failure on `path`.
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => LibraryError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => LibraryError::PermissionDenied { path },
            _ => LibraryError::Storage { path, source },
        }
    }

    /// True for every filesystem failure (as opposed to naming violations).
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            LibraryError::DirectoryNotFound { .. }
                | LibraryError::NotFound { .. }
                | LibraryError::PermissionDenied { .. }
                | LibraryError::Storage { .. }
        )
    }
}

/// Errors from the filter registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter: {name}")]
    UnknownFilter { name: String },

    #[error("No preset registered for filter {name}")]
    MissingPreset { name: String },
}

/// Errors from external raw collaborators (DNG converter, raw developer)
#[derive(Error, Debug)]
pub enum RawError {
    #[error("DNG conversion of {path} failed: {reason}")]
    Conversion { path: PathBuf, reason: String },

    #[error("Developing {path} failed: {reason}")]
    Develop { path: PathBuf, reason: String },

    #[error("No DNG converter configured")]
    ConverterUnavailable,

    #[error("Raw developer is not available")]
    DeveloperUnavailable,
}

/// Errors from the super-night enhancement path
#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("Tensor data length {actual} does not match shape {channels}x{height}x{width}")]
    ShapeMismatch {
        channels: usize,
        height: usize,
        width: usize,
        actual: usize,
    },

    #[error("Expected a {expected}-channel tensor, got {actual} channels")]
    UnexpectedChannels { expected: usize, actual: usize },

    #[error("Preprocessing {path} failed: {reason}")]
    Preprocess { path: PathBuf, reason: String },

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Enhancement model is not loaded")]
    ModelUnavailable,
}

/// Errors while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DarkroomError>;
