//! Driver without hardware that logs every write.

use super::{CameraDriver, CaptureFormat, GainKind, IsoSetting, PreviewWindow, ShutterSetting};
use crate::core::exposure::ExposureMode;
use crate::error::DriverError;
use std::path::Path;
use tracing::info;

/// Logs exposure writes through `tracing` and refuses to capture.
///
/// Used by the CLI to exercise the exposure controller on a machine
/// without a camera module.
#[derive(Debug, Default)]
pub struct LoggingDriver {
    iso: Option<IsoSetting>,
    shutter: Option<ShutterSetting>,
}

impl LoggingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last ISO written
    pub fn iso(&self) -> Option<IsoSetting> {
        self.iso
    }

    /// Last shutter speed written
    pub fn shutter(&self) -> Option<ShutterSetting> {
        self.shutter
    }
}

impl CameraDriver for LoggingDriver {
    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), DriverError> {
        info!(?mode, "set exposure mode");
        Ok(())
    }

    fn set_iso(&mut self, iso: IsoSetting) -> Result<(), DriverError> {
        info!(iso = iso.raw(), "set iso");
        self.iso = Some(iso);
        Ok(())
    }

    fn set_shutter_speed(&mut self, shutter: ShutterSetting) -> Result<(), DriverError> {
        info!(micros = shutter.raw(), "set shutter speed");
        self.shutter = Some(shutter);
        Ok(())
    }

    fn set_gain(&mut self, kind: GainKind, value: f32) -> Result<(), DriverError> {
        info!(%kind, value, "set gain");
        Ok(())
    }

    fn capture(&mut self, output: &Path, _format: CaptureFormat) -> Result<u64, DriverError> {
        Err(DriverError::Capture {
            path: output.to_path_buf(),
            reason: "no camera module attached".to_string(),
        })
    }

    fn start_preview(&mut self, window: PreviewWindow) -> Result<(), DriverError> {
        info!(?window, "start preview");
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), DriverError> {
        info!("stop preview");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_last_values() {
        let mut driver = LoggingDriver::new();
        driver.set_iso(IsoSetting::Value(200)).unwrap();
        driver.set_shutter_speed(ShutterSetting::Auto).unwrap();

        assert_eq!(driver.iso(), Some(IsoSetting::Value(200)));
        assert_eq!(driver.shutter(), Some(ShutterSetting::Auto));
    }

    #[test]
    fn capture_is_refused() {
        let mut driver = LoggingDriver::new();
        let result = driver.capture(Path::new("/tmp/0.jpg"), CaptureFormat::JpegWithBayer);
        assert!(matches!(result, Err(DriverError::Capture { .. })));
    }
}
