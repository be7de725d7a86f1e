use serde::{Deserialize, Serialize};

use crate::prelude::{Angle, SpectralSummary};

/// Column order of the persisted table.
pub const COLUMNS: [&str; 4] = ["azimuth", "elevation", "frequency_hz", "peak_power"];

/// One persisted measurement: where the mount pointed, what was tuned, what was seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub azimuth: f64,
    pub elevation: f64,
    pub frequency_hz: f64,
    pub peak_power: f64,
}

impl ScanRecord {
    pub fn new(azimuth: Angle, elevation: Angle, summary: SpectralSummary) -> Self {
        Self {
            azimuth: azimuth.degrees(),
            elevation: elevation.degrees(),
            frequency_hz: summary.frequency_hz,
            peak_power: summary.peak_power,
        }
    }

    /// Comma-separated row including the trailing newline.
    pub fn to_row(&self) -> String {
        format!(
            "{},{},{},{}\n",
            self.azimuth, self.elevation, self.frequency_hz, self.peak_power
        )
    }

    pub fn from_row(row: &str) -> Result<Self, String> {
        let fields: Vec<&str> = row.trim().split(',').map(str::trim).collect();
        if fields.len() != COLUMNS.len() {
            return Err(format!(
                "expected {} columns, found {}",
                COLUMNS.len(),
                fields.len()
            ));
        }

        let mut values = [0.0; 4];
        for (slot, (field, name)) in values.iter_mut().zip(fields.iter().zip(COLUMNS)) {
            *slot = field
                .parse::<f64>()
                .map_err(|e| format!("{} '{}': {}", name, field, e))?;
        }

        Ok(Self {
            azimuth: values[0],
            elevation: values[1],
            frequency_hz: values[2],
            peak_power: values[3],
        })
    }
}
