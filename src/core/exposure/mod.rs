//! # Exposure Module
//!
//! Auto/manual exposure and the mapping from control positions to
//! hardware units.
//!
//! ## Behaviour
//! - **Auto** - ISO and shutter are left to the firmware (sentinel `0`)
//!   and the manual controls are disabled
//! - **Manual** - ISO = `iso_index * iso_step`, shutter =
//!   `round(1_000_000 / denominator)` microseconds
//! - Every accepted change is written to the driver at once
//! - State is committed only after the driver accepted every write
//!
//! ## Example
//! ```rust,ignore
//! let mut exposure = ExposureController::new(driver, ExposureSettings::default(), events)?;
//! exposure.set_mode(false)?; // manual
//! exposure.set_shutter_index(11)?; // 1/125 s
//! println!("{}", exposure.describe());
//! ```

mod shutter;
mod types;

pub use shutter::ShutterTable;
pub use types::{ExposureMode, ExposureReadout, ExposureSettings, ExposureState};

use crate::core::camera::{
    CameraDriver, CaptureFormat, GainKind, IsoSetting, PreviewWindow, ShutterSetting,
};
use crate::error::{DriverError, ExposureControl, ExposureError};
use crate::events::{Event, EventSender, ExposureEvent};
use std::path::Path;
use tracing::{debug, info};

/// Owns the camera driver and the exposure state.
///
/// No other component writes exposure parameters; captures and preview
/// calls pass through here because the controller holds the only driver
/// handle.
pub struct ExposureController {
    driver: Box<dyn CameraDriver>,
    settings: ExposureSettings,
    state: ExposureState,
    events: EventSender,
}

impl ExposureController {
    /// Validate settings, reset digital gain and start in auto mode.
    ///
    /// Nothing is pushed to the driver besides the gain; call
    /// [`Self::apply`] (or show the preview) to write the exposure.
    pub fn new(
        mut driver: Box<dyn CameraDriver>,
        settings: ExposureSettings,
        events: EventSender,
    ) -> Result<Self, ExposureError> {
        settings.validate()?;
        driver.set_gain(GainKind::Digital, 1.0)?;

        let state = settings.initial_state();
        Ok(Self {
            driver,
            settings,
            state,
            events,
        })
    }

    pub fn state(&self) -> ExposureState {
        self.state
    }

    pub fn mode(&self) -> ExposureMode {
        self.state.mode
    }

    pub fn settings(&self) -> &ExposureSettings {
        &self.settings
    }

    /// Whether the ISO and shutter controls should accept input
    pub fn controls_enabled(&self) -> bool {
        self.state.mode == ExposureMode::Manual
    }

    /// Switch between auto and manual exposure
    pub fn set_mode(&mut self, auto: bool) -> Result<(), ExposureError> {
        let mode = if auto {
            ExposureMode::Auto
        } else {
            ExposureMode::Manual
        };
        let target = ExposureState { mode, ..self.state };

        self.push(&target)?;
        self.state = target;

        info!(?mode, "exposure mode changed");
        self.events.send(Event::Exposure(ExposureEvent::ModeChanged {
            mode,
            controls_enabled: self.controls_enabled(),
        }));
        Ok(())
    }

    /// Move the ISO control; manual mode only, out-of-range is rejected
    pub fn set_iso_index(&mut self, index: i64) -> Result<(), ExposureError> {
        self.ensure_unlocked(ExposureControl::Iso)?;
        let iso_index = self.settings.check_iso_index(index)?;
        self.commit(ExposureState {
            iso_index,
            ..self.state
        })
    }

    /// Move the shutter control; manual mode only, out-of-range is rejected
    pub fn set_shutter_index(&mut self, index: i64) -> Result<(), ExposureError> {
        self.ensure_unlocked(ExposureControl::Shutter)?;
        let shutter_index = self.settings.shutter.check_index(index)?;
        self.commit(ExposureState {
            shutter_index,
            ..self.state
        })
    }

    /// Write the current state to the driver again
    pub fn apply(&mut self) -> Result<(), ExposureError> {
        let state = self.state;
        self.push(&state)?;
        Ok(())
    }

    pub fn resolve_iso(&self, index: i64) -> Result<u32, ExposureError> {
        self.settings.resolve_iso(index)
    }

    pub fn resolve_shutter_micros(&self, index: i64) -> Result<u32, ExposureError> {
        self.settings.resolve_shutter_micros(index)
    }

    /// Label values for the current control positions
    pub fn describe(&self) -> ExposureReadout {
        let denominator = self.settings.shutter.denominators()[self.state.shutter_index];
        ExposureReadout {
            // range checked by `validate` in `new`
            iso: self.state.iso_index.saturating_mul(self.settings.iso_step),
            shutter: format!("1/{} (s)", denominator),
        }
    }

    /// Capture a still through the owned driver
    pub fn capture(&mut self, output: &Path, format: CaptureFormat) -> Result<u64, DriverError> {
        self.driver.capture(output, format)
    }

    pub fn start_preview(&mut self, window: PreviewWindow) -> Result<(), DriverError> {
        self.driver.start_preview(window)
    }

    pub fn stop_preview(&mut self) -> Result<(), DriverError> {
        self.driver.stop_preview()
    }

    fn ensure_unlocked(&self, control: ExposureControl) -> Result<(), ExposureError> {
        if self.controls_enabled() {
            Ok(())
        } else {
            Err(ExposureError::ControlsLocked { control })
        }
    }

    fn commit(&mut self, target: ExposureState) -> Result<(), ExposureError> {
        self.push(&target)?;
        self.state = target;

        self.events.send(Event::Exposure(ExposureEvent::IndexChanged {
            iso_index: target.iso_index,
            shutter_index: target.shutter_index,
        }));
        Ok(())
    }

    fn push(&mut self, target: &ExposureState) -> Result<(), ExposureError> {
        let (iso, shutter) = match target.mode {
            ExposureMode::Auto => (IsoSetting::Auto, ShutterSetting::Auto),
            ExposureMode::Manual => (
                IsoSetting::Value(self.settings.iso_value(target.iso_index)?),
                ShutterSetting::Micros(self.settings.shutter.micros(target.shutter_index as i64)?),
            ),
        };

        debug!(mode = ?target.mode, iso = iso.raw(), shutter = shutter.raw(), "writing exposure");
        self.driver.set_exposure_mode(target.mode)?;
        self.driver.set_iso(iso)?;
        self.driver.set_shutter_speed(shutter)?;

        self.events.send(Event::Exposure(ExposureEvent::Applied {
            iso: iso.raw(),
            shutter_micros: shutter.raw(),
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::{DriverCall, DriverCallKind, RecordingDriver};
    use crate::events::{null_sender, EventChannel};

    fn controller() -> (ExposureController, RecordingDriver) {
        let driver = RecordingDriver::new();
        let controller = ExposureController::new(
            Box::new(driver.clone()),
            ExposureSettings::default(),
            null_sender(),
        )
        .unwrap();
        driver.clear();
        (controller, driver)
    }

    fn exposure_writes(driver: &RecordingDriver) -> Vec<DriverCall> {
        driver
            .calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call.kind(),
                    DriverCallKind::ExposureMode | DriverCallKind::Iso | DriverCallKind::Shutter
                )
            })
            .collect()
    }

    #[test]
    fn new_resets_digital_gain_and_starts_auto() {
        let driver = RecordingDriver::new();
        let controller = ExposureController::new(
            Box::new(driver.clone()),
            ExposureSettings::default(),
            null_sender(),
        )
        .unwrap();

        assert_eq!(driver.calls(), vec![DriverCall::Gain(GainKind::Digital, 1.0)]);
        assert_eq!(controller.mode(), ExposureMode::Auto);
        assert!(!controller.controls_enabled());
    }

    #[test]
    fn overflowing_iso_range_fails_construction() {
        let driver = RecordingDriver::new();
        let settings = ExposureSettings {
            iso_step: 100_000_000,
            iso_max_index: 100,
            ..ExposureSettings::default()
        };

        let result = ExposureController::new(Box::new(driver.clone()), settings, null_sender());

        assert!(matches!(result, Err(ExposureError::IsoOverflow { .. })));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn unsupported_gain_fails_construction() {
        let driver = RecordingDriver::new();
        driver.fail_on(
            DriverCallKind::Gain,
            DriverError::Unsupported {
                parameter: "digital gain".to_string(),
            },
        );

        let result =
            ExposureController::new(Box::new(driver), ExposureSettings::default(), null_sender());
        assert!(matches!(result, Err(ExposureError::Driver(DriverError::Unsupported { .. }))));
    }

    #[test]
    fn auto_mode_sends_sentinels_regardless_of_indices() {
        let (mut controller, driver) = controller();
        controller.set_mode(false).unwrap();
        controller.set_iso_index(40).unwrap();
        controller.set_shutter_index(20).unwrap();
        driver.clear();

        controller.set_mode(true).unwrap();

        assert_eq!(
            exposure_writes(&driver),
            vec![
                DriverCall::ExposureMode(ExposureMode::Auto),
                DriverCall::Iso(IsoSetting::Auto),
                DriverCall::Shutter(ShutterSetting::Auto),
            ]
        );
        assert!(!controller.controls_enabled());
    }

    #[test]
    fn manual_after_auto_reuses_current_indices() {
        let (mut controller, driver) = controller();
        controller.set_mode(false).unwrap();
        controller.set_iso_index(32).unwrap();
        controller.set_shutter_index(11).unwrap();
        controller.set_mode(true).unwrap();
        driver.clear();

        controller.set_mode(false).unwrap();

        assert_eq!(
            exposure_writes(&driver),
            vec![
                DriverCall::ExposureMode(ExposureMode::Manual),
                DriverCall::Iso(IsoSetting::Value(320)),
                DriverCall::Shutter(ShutterSetting::Micros(8000)),
            ]
        );
        assert!(controller.controls_enabled());
    }

    #[test]
    fn every_index_change_is_written_immediately() {
        let (mut controller, driver) = controller();
        controller.set_mode(false).unwrap();
        driver.clear();

        controller.set_iso_index(2).unwrap();
        controller.set_iso_index(3).unwrap();

        let isos: Vec<_> = driver
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                DriverCall::Iso(iso) => Some(iso),
                _ => None,
            })
            .collect();
        assert_eq!(isos, vec![IsoSetting::Value(20), IsoSetting::Value(30)]);
    }

    #[test]
    fn index_changes_are_locked_in_auto() {
        let (mut controller, driver) = controller();

        let result = controller.set_iso_index(5);

        assert!(matches!(
            result,
            Err(ExposureError::ControlsLocked {
                control: ExposureControl::Iso
            })
        ));
        assert!(driver.calls().is_empty());
        assert_eq!(controller.state().iso_index, 1);
    }

    #[test]
    fn out_of_range_indices_are_rejected_not_clamped() {
        let (mut controller, _driver) = controller();
        controller.set_mode(false).unwrap();

        assert!(matches!(
            controller.set_shutter_index(-1),
            Err(ExposureError::OutOfRange { index: -1, .. })
        ));
        assert!(matches!(
            controller.set_shutter_index(27),
            Err(ExposureError::OutOfRange { index: 27, .. })
        ));
        assert!(matches!(
            controller.set_iso_index(81),
            Err(ExposureError::OutOfRange { .. })
        ));
        assert_eq!(controller.state().shutter_index, 0);
        assert_eq!(controller.state().iso_index, 1);
    }

    #[test]
    fn driver_failure_preserves_state() {
        let (mut controller, driver) = controller();
        controller.set_mode(false).unwrap();
        controller.set_shutter_index(4).unwrap();
        driver.fail_on(
            DriverCallKind::Shutter,
            DriverError::Rejected {
                parameter: "shutter speed".to_string(),
                status: 1,
            },
        );

        assert!(controller.set_shutter_index(9).is_err());
        assert_eq!(controller.state().shutter_index, 4);

        assert!(controller.set_mode(true).is_err());
        assert_eq!(controller.mode(), ExposureMode::Manual);
    }

    #[test]
    fn describe_formats_current_indices() {
        let (mut controller, _driver) = controller();
        controller.set_mode(false).unwrap();
        controller.set_iso_index(10).unwrap();
        controller.set_shutter_index(26).unwrap();

        let readout = controller.describe();

        assert_eq!(readout.iso, 100);
        assert_eq!(readout.shutter, "1/4000 (s)");
    }

    #[test]
    fn apply_rewrites_current_state() {
        let (mut controller, driver) = controller();
        controller.apply().unwrap();
        assert_eq!(exposure_writes(&driver).len(), 3);
    }

    #[test]
    fn mode_change_is_reported() {
        let (sender, receiver) = EventChannel::new();
        let mut controller = ExposureController::new(
            Box::new(RecordingDriver::new()),
            ExposureSettings::default(),
            sender,
        )
        .unwrap();

        controller.set_mode(false).unwrap();

        let changed = receiver.drain().into_iter().any(|event| {
            matches!(
                event,
                Event::Exposure(ExposureEvent::ModeChanged {
                    mode: ExposureMode::Manual,
                    controls_enabled: true
                })
            )
        });
        assert!(changed);
    }
}
