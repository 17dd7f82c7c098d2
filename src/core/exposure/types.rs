//! Types for the exposure module.

use super::ShutterTable;
use crate::error::{ExposureControl, ExposureError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who chooses ISO and shutter speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExposureMode {
    /// Firmware decides; manual controls are disabled
    #[default]
    Auto,
    /// Values come from the control indices
    Manual,
}

/// Current exposure state held by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureState {
    pub mode: ExposureMode,
    /// Position of the ISO control
    pub iso_index: u32,
    /// Position in the shutter table
    pub shutter_index: usize,
}

/// Fixed parameters of the exposure controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureSettings {
    /// ISO units per control step
    pub iso_step: u32,
    /// Lowest ISO control position
    pub iso_min_index: u32,
    /// Highest ISO control position
    pub iso_max_index: u32,
    /// Shutter denominators, one per control position
    #[serde(rename = "shutter_denominators")]
    pub shutter: ShutterTable,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            iso_step: 10,
            iso_min_index: 1,
            iso_max_index: 80,
            shutter: ShutterTable::default(),
        }
    }
}

impl ExposureSettings {
    /// Check the ISO range; the shutter table validates itself
    pub fn validate(&self) -> Result<(), ExposureError> {
        if self.iso_step == 0 || self.iso_min_index > self.iso_max_index {
            return Err(ExposureError::InvalidIsoRange {
                min: self.iso_min_index,
                max: self.iso_max_index,
            });
        }
        self.iso_value(self.iso_max_index)?;
        Ok(())
    }

    /// Check an ISO control position
    pub fn check_iso_index(&self, index: i64) -> Result<u32, ExposureError> {
        u32::try_from(index)
            .ok()
            .filter(|i| (self.iso_min_index..=self.iso_max_index).contains(i))
            .ok_or(ExposureError::OutOfRange {
                control: ExposureControl::Iso,
                index,
                min: self.iso_min_index as i64,
                max: self.iso_max_index as i64,
            })
    }

    /// `index * iso_step`
    pub fn resolve_iso(&self, index: i64) -> Result<u32, ExposureError> {
        self.iso_value(self.check_iso_index(index)?)
    }

    /// ISO for an already checked index
    pub(crate) fn iso_value(&self, index: u32) -> Result<u32, ExposureError> {
        index
            .checked_mul(self.iso_step)
            .ok_or(ExposureError::IsoOverflow {
                index,
                step: self.iso_step,
            })
    }

    /// `round(1_000_000 / shutter[index])`
    pub fn resolve_shutter_micros(&self, index: i64) -> Result<u32, ExposureError> {
        self.shutter.micros(index)
    }

    /// State a fresh controller starts in
    pub fn initial_state(&self) -> ExposureState {
        ExposureState {
            mode: ExposureMode::Auto,
            iso_index: self.iso_min_index,
            shutter_index: 0,
        }
    }
}

/// Display values for the ISO and shutter labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureReadout {
    pub iso: u32,
    pub shutter: String,
}

impl fmt::Display for ExposureReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ISO {}  S {}", self.iso, self.shutter)
    }
}
