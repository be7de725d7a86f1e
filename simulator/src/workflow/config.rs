use anyhow::Context;
use scancore::prelude::{ScanSettings, SweepSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::profile::GeneratorConfig;

/// Wiring of the simulated devices.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub azimuth_pin: u8,
    pub elevation_pin: u8,
    /// Time each simulated read takes; a value above the acquisition timeout forces timeouts.
    pub read_latency_ms: u64,
    pub sky: GeneratorConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            azimuth_pin: 18,
            elevation_pin: 23,
            read_latency_ms: 0,
            sky: GeneratorConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub azimuth: f64,
    pub elevation: f64,
    pub output: PathBuf,
    pub scan: ScanSettings,
    pub simulation: SimulationConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            azimuth: 90.0,
            elevation: 45.0,
            output: PathBuf::from("scan_data.csv"),
            scan: ScanSettings::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the loaded file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub azimuth: Option<f64>,
    pub elevation: Option<f64>,
    pub start_hz: Option<f64>,
    pub stop_hz: Option<f64>,
    pub steps: Option<usize>,
    pub settle_ms: Option<u64>,
    pub output: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(overrides: &Overrides) -> anyhow::Result<Self> {
        Self::default().with_overrides(overrides)
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> anyhow::Result<Self> {
        if let Some(azimuth) = overrides.azimuth {
            self.azimuth = azimuth;
        }
        if let Some(elevation) = overrides.elevation {
            self.elevation = elevation;
        }
        if let Some(settle_ms) = overrides.settle_ms {
            self.scan.settle_ms = settle_ms;
        }
        if let Some(output) = &overrides.output {
            self.output = output.clone();
        }

        let sweep = self.scan.sweep;
        if overrides.start_hz.is_some() || overrides.stop_hz.is_some() || overrides.steps.is_some()
        {
            self.scan.sweep = SweepSpec::new(
                overrides.start_hz.unwrap_or(sweep.start_hz),
                overrides.stop_hz.unwrap_or(sweep.stop_hz),
                overrides.steps.unwrap_or(sweep.step_count),
            )
            .context("building sweep from command line")?;
        }
        Ok(self)
    }
}
