//! Shutter speed table.

use crate::error::{ExposureControl, ExposureError};
use serde::{Deserialize, Serialize};

const MICROS_PER_SECOND: u32 = 1_000_000;

/// Ordered exposure-time denominators (`10` means 1/10 s).
///
/// Every entry is positive and strictly larger than the one before it,
/// so index order is fastest-last and no resolution ever divides by zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ShutterTable {
    denominators: Vec<u32>,
}

impl ShutterTable {
    /// 1/10 s through 1/4000 s in third-stop-ish steps
    pub const DEFAULT_DENOMINATORS: [u32; 27] = [
        10, 13, 15, 20, 25, 30, 40, 50, 60, 80, 100, 125, 160, 200, 250, 320, 400, 500, 640, 800,
        1000, 1250, 1600, 2000, 2500, 3200, 4000,
    ];

    /// Build a table, rejecting empty, zero or unordered denominators
    pub fn new(denominators: Vec<u32>) -> Result<Self, ExposureError> {
        if denominators.is_empty() {
            return Err(ExposureError::InvalidShutterTable {
                reason: "table is empty".to_string(),
            });
        }

        if let Some(position) = denominators.iter().position(|&d| d == 0) {
            return Err(ExposureError::InvalidShutterTable {
                reason: format!("denominator at position {} is zero", position),
            });
        }

        if let Some(pair) = denominators.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ExposureError::InvalidShutterTable {
                reason: format!("{} is not followed by a larger denominator ({})", pair[0], pair[1]),
            });
        }

        Ok(Self { denominators })
    }

    pub fn len(&self) -> usize {
        self.denominators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.denominators.is_empty()
    }

    pub fn denominators(&self) -> &[u32] {
        &self.denominators
    }

    /// Check a control position against the table bounds
    pub fn check_index(&self, index: i64) -> Result<usize, ExposureError> {
        let max = self.denominators.len() - 1;
        usize::try_from(index)
            .ok()
            .filter(|&i| i <= max)
            .ok_or(ExposureError::OutOfRange {
                control: ExposureControl::Shutter,
                index,
                min: 0,
                max: max as i64,
            })
    }

    /// Denominator at a checked index
    pub fn denominator(&self, index: i64) -> Result<u32, ExposureError> {
        let index = self.check_index(index)?;
        Ok(self.denominators[index])
    }

    /// `round(1_000_000 / denominator)` for the entry at `index`
    pub fn micros(&self, index: i64) -> Result<u32, ExposureError> {
        let denominator = self.denominator(index)?;
        Ok((MICROS_PER_SECOND + denominator / 2) / denominator)
    }

    /// Display label, e.g. `1/125 (s)`
    pub fn label(&self, index: i64) -> Result<String, ExposureError> {
        Ok(format!("1/{} (s)", self.denominator(index)?))
    }
}

impl Default for ShutterTable {
    fn default() -> Self {
        Self {
            denominators: Self::DEFAULT_DENOMINATORS.to_vec(),
        }
    }
}

impl TryFrom<Vec<u32>> for ShutterTable {
    type Error = ExposureError;

    fn try_from(denominators: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(denominators)
    }
}

impl From<ShutterTable> for Vec<u32> {
    fn from(table: ShutterTable) -> Self {
        table.denominators
    }
}
