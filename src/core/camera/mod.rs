//! # Camera Module
//!
//! The boundary to the camera firmware.
//!
//! The core never talks to hardware directly. Everything it needs from the
//! camera goes through [`CameraDriver`], which a platform crate implements
//! on top of the vendor API. Two implementations ship here:
//! - `LoggingDriver` - no hardware, logs every write (headless CLI)
//! - `RecordingDriver` - in-memory, records calls and injects failures (tests)

mod logging;
mod recording;

pub use logging::LoggingDriver;
pub use recording::{DriverCall, DriverCallKind, RecordingDriver};

use crate::core::exposure::ExposureMode;
use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Value the driver interprets as "let the hardware decide".
pub const AUTO_SENTINEL: u32 = 0;

/// ISO value sent to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsoSetting {
    Auto,
    Value(u32),
}

impl IsoSetting {
    /// The raw number the firmware expects
    pub fn raw(&self) -> u32 {
        match self {
            IsoSetting::Auto => AUTO_SENTINEL,
            IsoSetting::Value(iso) => *iso,
        }
    }
}

/// Shutter speed sent to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutterSetting {
    Auto,
    Micros(u32),
}

impl ShutterSetting {
    /// The raw number of microseconds the firmware expects
    pub fn raw(&self) -> u32 {
        match self {
            ShutterSetting::Auto => AUTO_SENTINEL,
            ShutterSetting::Micros(us) => *us,
        }
    }
}

/// Sensor gain stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainKind {
    Analog,
    Digital,
}

impl fmt::Display for GainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GainKind::Analog => write!(f, "analog gain"),
            GainKind::Digital => write!(f, "digital gain"),
        }
    }
}

/// Still capture output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureFormat {
    /// JPEG with the raw Bayer data appended (input for DNG conversion)
    JpegWithBayer,
    /// Plain JPEG
    Jpeg,
}

/// On-screen rectangle for the live preview overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewWindow {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for PreviewWindow {
    fn default() -> Self {
        // 4:3 overlay left of the control column
        Self {
            x: 5,
            y: 40,
            width: 500,
            height: 375,
        }
    }
}

/// Trait for camera drivers
///
/// Implementations translate each call into one firmware write. Calls are
/// never retried by the core; a failure is returned to whoever asked.
pub trait CameraDriver: Send {
    /// Switch the firmware's exposure algorithm
    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), DriverError>;

    /// Set sensor sensitivity
    fn set_iso(&mut self, iso: IsoSetting) -> Result<(), DriverError>;

    /// Set exposure time
    fn set_shutter_speed(&mut self, shutter: ShutterSetting) -> Result<(), DriverError>;

    /// Set an analog or digital gain stage
    fn set_gain(&mut self, kind: GainKind, value: f32) -> Result<(), DriverError>;

    /// Capture a still to `output`, returning the number of bytes written
    fn capture(&mut self, output: &Path, format: CaptureFormat) -> Result<u64, DriverError>;

    /// Start the live preview overlay
    fn start_preview(&mut self, window: PreviewWindow) -> Result<(), DriverError>;

    /// Stop the live preview overlay
    fn stop_preview(&mut self) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_settings_use_the_sentinel() {
        assert_eq!(IsoSetting::Auto.raw(), 0);
        assert_eq!(ShutterSetting::Auto.raw(), 0);
        assert_eq!(IsoSetting::Value(400).raw(), 400);
        assert_eq!(ShutterSetting::Micros(8000).raw(), 8000);
    }

    #[test]
    fn default_preview_is_four_by_three() {
        let window = PreviewWindow::default();
        assert_eq!(window.width * 3, window.height * 4);
        assert_eq!((window.x, window.y), (5, 40));
    }
}
