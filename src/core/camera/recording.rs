//! In-memory driver that records every call.
//!
//! No hardware involved; failures can be injected per call kind.

use super::{CameraDriver, CaptureFormat, GainKind, IsoSetting, PreviewWindow, ShutterSetting};
use crate::core::exposure::ExposureMode;
use crate::error::DriverError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A call received by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    ExposureMode(ExposureMode),
    Iso(IsoSetting),
    Shutter(ShutterSetting),
    Gain(GainKind, f32),
    Capture(PathBuf, CaptureFormat),
    StartPreview(PreviewWindow),
    StopPreview,
}

impl DriverCall {
    pub fn kind(&self) -> DriverCallKind {
        match self {
            DriverCall::ExposureMode(_) => DriverCallKind::ExposureMode,
            DriverCall::Iso(_) => DriverCallKind::Iso,
            DriverCall::Shutter(_) => DriverCallKind::Shutter,
            DriverCall::Gain(..) => DriverCallKind::Gain,
            DriverCall::Capture(..) => DriverCallKind::Capture,
            DriverCall::StartPreview(_) => DriverCallKind::StartPreview,
            DriverCall::StopPreview => DriverCallKind::StopPreview,
        }
    }
}

/// Discriminant of [`DriverCall`], used to target failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverCallKind {
    ExposureMode,
    Iso,
    Shutter,
    Gain,
    Capture,
    StartPreview,
    StopPreview,
}

#[derive(Default)]
struct Shared {
    calls: Vec<DriverCall>,
    failures: HashMap<DriverCallKind, DriverError>,
}

/// Driver that keeps calls in memory.
///
/// Clones share the same log, so a test can keep one handle while the
/// controller owns another.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    shared: Arc<Mutex<Shared>>,
}

impl RecordingDriver {
    /// Bytes written by a simulated capture
    pub const CAPTURE_PAYLOAD: &'static [u8] = b"JPEG+BAYER";

    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<DriverCall> {
        self.shared
            .lock()
            .map(|shared| shared.calls.clone())
            .unwrap_or_default()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.calls.clear();
        }
    }

    /// Make every call of `kind` fail with `error` until [`Self::heal`]
    pub fn fail_on(&self, kind: DriverCallKind, error: DriverError) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.failures.insert(kind, error);
        }
    }

    /// Remove all injected failures
    pub fn heal(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            shared.failures.clear();
        }
    }

    fn record(&self, call: DriverCall) -> Result<(), DriverError> {
        let mut shared = match self.shared.lock() {
            Ok(shared) => shared,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(error) = shared.failures.get(&call.kind()) {
            return Err(error.clone());
        }
        shared.calls.push(call);
        Ok(())
    }
}

impl CameraDriver for RecordingDriver {
    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), DriverError> {
        self.record(DriverCall::ExposureMode(mode))
    }

    fn set_iso(&mut self, iso: IsoSetting) -> Result<(), DriverError> {
        self.record(DriverCall::Iso(iso))
    }

    fn set_shutter_speed(&mut self, shutter: ShutterSetting) -> Result<(), DriverError> {
        self.record(DriverCall::Shutter(shutter))
    }

    fn set_gain(&mut self, kind: GainKind, value: f32) -> Result<(), DriverError> {
        self.record(DriverCall::Gain(kind, value))
    }

    fn capture(&mut self, output: &Path, format: CaptureFormat) -> Result<u64, DriverError> {
        self.record(DriverCall::Capture(output.to_path_buf(), format))?;
        fs::write(output, Self::CAPTURE_PAYLOAD).map_err(|e| DriverError::Capture {
            path: output.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::CAPTURE_PAYLOAD.len() as u64)
    }

    fn start_preview(&mut self, window: PreviewWindow) -> Result<(), DriverError> {
        self.record(DriverCall::StartPreview(window))
    }

    fn stop_preview(&mut self) -> Result<(), DriverError> {
        self.record(DriverCall::StopPreview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clones_share_the_call_log() {
        let observer = RecordingDriver::new();
        let mut driver = observer.clone();

        driver.set_iso(IsoSetting::Value(100)).unwrap();

        assert_eq!(observer.calls(), vec![DriverCall::Iso(IsoSetting::Value(100))]);
    }

    #[test]
    fn injected_failure_is_returned_and_not_recorded() {
        let mut driver = RecordingDriver::new();
        driver.fail_on(
            DriverCallKind::Shutter,
            DriverError::Rejected {
                parameter: "shutter speed".to_string(),
                status: 3,
            },
        );

        assert!(driver.set_shutter_speed(ShutterSetting::Micros(100)).is_err());
        assert!(driver.calls().is_empty());

        driver.heal();
        assert!(driver.set_shutter_speed(ShutterSetting::Micros(100)).is_ok());
        assert_eq!(driver.calls().len(), 1);
    }

    #[test]
    fn capture_writes_payload_to_disk() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("0.jpg");
        let mut driver = RecordingDriver::new();

        let written = driver.capture(&output, CaptureFormat::JpegWithBayer).unwrap();

        assert_eq!(written, RecordingDriver::CAPTURE_PAYLOAD.len() as u64);
        assert_eq!(fs::read(&output).unwrap(), RecordingDriver::CAPTURE_PAYLOAD);
    }
}
