use crate::devices::{SimulatedPwm, SimulatedReceiver};
use crate::workflow::config::WorkflowConfig;
use anyhow::{anyhow, Context};
use scancore::controller::{ScanController, ScanRequest, ScanService};
use scancore::hardware::ServoMount;
use scancore::storage::{read_records, CsvScanRecorder, ScanRecord};
use std::path::PathBuf;
use std::time::Duration;

pub type SimulatedService =
    ScanService<ServoMount<SimulatedPwm>, SimulatedReceiver, CsvScanRecorder>;

#[derive(Debug)]
pub struct WorkflowResult {
    pub steps_completed: usize,
    pub total_steps: usize,
    pub last_frequency_hz: Option<f64>,
    /// Strongest record in the output table, including rows from earlier runs.
    pub strongest: Option<ScanRecord>,
    pub output: PathBuf,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Wires simulated servos and radio into a ready scan service.
    pub fn build_service(&self) -> anyhow::Result<SimulatedService> {
        let settings = self.config.scan.clone();
        let sim = &self.config.simulation;
        let mount = ServoMount::new(
            SimulatedPwm::new(sim.azimuth_pin),
            SimulatedPwm::new(sim.elevation_pin),
            settings.settle(),
        );
        let receiver = SimulatedReceiver::new(
            sim.sky.clone(),
            Duration::from_millis(sim.read_latency_ms),
        );
        let recorder = CsvScanRecorder::new(&self.config.output);
        let controller = ScanController::new(settings, mount, receiver, recorder)
            .context("initializing scan controller")?;
        Ok(ScanService::new(controller))
    }

    pub fn request(&self) -> ScanRequest {
        ScanRequest::new(
            self.config.azimuth,
            self.config.elevation,
            self.config.scan.sweep,
        )
    }

    /// Runs the configured scan to completion on `service`.
    pub fn execute(&self, service: &SimulatedService) -> anyhow::Result<WorkflowResult> {
        service.start(self.request()).context("starting scan")?;
        let report = service
            .wait()
            .ok_or_else(|| anyhow!("scan worker exited without a result"))?
            .context("running scan")?;

        let records = read_records(&self.config.output)
            .with_context(|| format!("reading back {}", self.config.output.display()))?;
        let strongest = records
            .into_iter()
            .max_by(|a, b| a.peak_power.total_cmp(&b.peak_power));

        Ok(WorkflowResult {
            steps_completed: report.steps_completed,
            total_steps: report.total_steps,
            last_frequency_hz: report.last_frequency_hz,
            strongest,
            output: self.config.output.clone(),
        })
    }
}
