use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};

use crate::controller::events::{ProgressEvent, ScanEvent, ScanObserver, StopToken};
use crate::controller::session::{ScanAbort, ScanReport, ScanRequest, ScanSession};
use crate::controller::state::{ScanState, ScanStatus};
use crate::hardware::{Actuator, Receiver, ReceiverSweep};
use crate::math::stats::StatsHelper;
use crate::prelude::{Axis, ScanError, ScanResult, ScanSettings, SpectralSummary};
use crate::processing::{SignalConditioner, SpectralAnalyzer};
use crate::storage::{ScanRecord, ScanRecorder};
use crate::telemetry::{LogManager, MetricsRecorder};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Positions the mount, then sweeps the receiver and records one row per step.
///
/// The controller owns its capabilities for its whole life; whoever composes
/// the system hands them over at construction. Dropping the controller
/// de-energizes the mount and releases the receiver.
pub struct ScanController<A, R, S>
where
    A: Actuator,
    R: Receiver,
    S: ScanRecorder,
{
    settings: ScanSettings,
    actuator: A,
    receiver: ReceiverSweep<R>,
    recorder: S,
    conditioner: SignalConditioner,
    analyzer: SpectralAnalyzer,
    state: ScanState,
    status: Arc<Mutex<ScanStatus>>,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
    closed: bool,
}

impl<A, R, S> ScanController<A, R, S>
where
    A: Actuator,
    R: Receiver,
    S: ScanRecorder,
{
    pub fn new(settings: ScanSettings, actuator: A, receiver: R, recorder: S) -> ScanResult<Self> {
        settings.validate()?;
        let conditioner = SignalConditioner::from_settings(&settings)
            .map_err(|err| ScanError::InvalidParameters(err.to_string()))?;
        let analyzer = SpectralAnalyzer::new(settings.block_length, settings.sample_rate);

        let mut receiver = ReceiverSweep::new(receiver, &settings);
        receiver.open()?;

        Ok(Self {
            settings,
            actuator,
            receiver,
            recorder,
            conditioner,
            analyzer,
            state: ScanState::Idle,
            status: Arc::new(Mutex::new(ScanStatus::default())),
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("scan"),
            closed: false,
        })
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn status(&self) -> ScanStatus {
        lock(&self.status).clone()
    }

    pub fn status_handle(&self) -> Arc<Mutex<ScanStatus>> {
        self.status.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    /// Runs one complete scan on the calling thread.
    ///
    /// Invalid requests are rejected before any capability is touched. Any
    /// failure after that aborts the rest of the sweep; rows already appended
    /// stay on disk and the abort reports how many there are.
    pub fn run_scan(
        &mut self,
        request: &ScanRequest,
        stop: &StopToken,
        observer: &dyn ScanObserver,
    ) -> Result<ScanReport, ScanAbort> {
        if self.closed {
            return Err(ScanAbort::rejected(
                ScanError::InvalidParameters("controller has been shut down".into()),
                request.sweep.step_count,
            ));
        }
        let (azimuth, elevation) = request
            .validate()
            .map_err(|err| ScanAbort::rejected(err, request.sweep.step_count))?;

        let mut session = ScanSession::new(azimuth, elevation, request.sweep);
        self.logger.record(&format!(
            "scan at az {} el {}: {} steps {}-{} Hz",
            azimuth,
            elevation,
            session.total_steps(),
            request.sweep.start_hz,
            request.sweep.stop_hz
        ));
        {
            let mut status = lock(&self.status);
            status.azimuth = Some(azimuth.degrees());
            status.elevation = Some(elevation.degrees());
            status.steps_completed = 0;
            status.total_steps = session.total_steps();
            status.last_frequency_hz = None;
        }

        let result = self.execute(&mut session, stop, observer);

        if let Err(err) = self.recorder.finish() {
            warn!("closing scan storage failed: {}", err);
        }

        let outcome = match result {
            Ok(()) => {
                self.transition(ScanState::Completed, observer);
                self.metrics.record_completed();
                let report = session.report();
                self.logger.record(&format!(
                    "scan completed: {}/{} steps",
                    report.steps_completed, report.total_steps
                ));
                Ok(report)
            }
            Err(err) => {
                self.actuator.release();
                self.transition(ScanState::Aborted, observer);
                self.metrics.record_aborted();
                let abort = session.abort(err);
                error!("{}", abort);
                Err(abort)
            }
        };

        let summary = match &outcome {
            Ok(report) => report.outcome(),
            Err(abort) => abort.outcome(),
        };
        lock(&self.status).last_outcome = Some(summary.clone());
        observer.on_event(&ScanEvent::Finished(summary));
        self.transition(ScanState::Idle, observer);

        outcome
    }

    fn execute(
        &mut self,
        session: &mut ScanSession,
        stop: &StopToken,
        observer: &dyn ScanObserver,
    ) -> ScanResult<()> {
        self.transition(ScanState::Positioning, observer);
        for (axis, angle) in [
            (Axis::Azimuth, session.azimuth),
            (Axis::Elevation, session.elevation),
        ] {
            if stop.is_stopped() {
                return Err(ScanError::Cancelled);
            }
            self.actuator.set_angle(axis, angle.degrees())?;
        }

        self.transition(ScanState::Sweeping, observer);
        self.recorder.begin()?;
        for frequency_hz in session.sweep.frequencies() {
            if stop.is_stopped() {
                return Err(ScanError::Cancelled);
            }
            self.step(session, frequency_hz, observer)?;
        }
        Ok(())
    }

    /// acquire -> condition -> analyze -> record -> notify, for one frequency.
    fn step(
        &mut self,
        session: &mut ScanSession,
        frequency_hz: f64,
        observer: &dyn ScanObserver,
    ) -> ScanResult<()> {
        let samples = self
            .receiver
            .tune_and_acquire(frequency_hz, self.settings.block_length)?;
        let conditioned = self.conditioner.process(&samples);
        let spectrum = self.analyzer.analyze(&conditioned)?;

        let summary = SpectralSummary {
            frequency_hz,
            peak_power: spectrum.peak_power,
        };
        let record = ScanRecord::new(session.azimuth, session.elevation, summary);
        self.recorder.append(&record)?;

        session.complete_step(frequency_hz);
        self.metrics.record_step();
        {
            let mut status = lock(&self.status);
            status.steps_completed = session.steps_completed();
            status.last_frequency_hz = Some(frequency_hz);
        }
        self.logger.trace_step(&format!(
            "{}/{} at {} Hz: peak {:.4e}, rms {:.4}",
            session.steps_completed(),
            session.total_steps(),
            frequency_hz,
            spectrum.peak_power,
            StatsHelper::rms(&conditioned)
        ));

        observer.on_event(&ScanEvent::Progress(ProgressEvent {
            step: session.steps_completed(),
            total_steps: session.total_steps(),
            frequency_hz,
            peak_power: record.peak_power,
            azimuth: record.azimuth,
            elevation: record.elevation,
        }));
        if self.settings.forward_spectrum {
            let frame = self.analyzer.frame(frequency_hz, spectrum);
            observer.on_event(&ScanEvent::Spectrum(frame));
        }
        Ok(())
    }

    fn transition(&mut self, next: ScanState, observer: &dyn ScanObserver) {
        if !self.state.can_transition_to(next) {
            error!("unexpected transition {:?} -> {:?}", self.state, next);
        }
        info!("scan state {:?} -> {:?}", self.state, next);
        self.state = next;
        lock(&self.status).state = next;
        observer.on_event(&ScanEvent::StateChanged { state: next });
    }

    /// De-energizes the mount and releases the receiver. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.actuator.shutdown();
        self.receiver.close();
        self.closed = true;
        self.logger.record("hardware released");
    }
}

impl<A, R, S> Drop for ScanController<A, R, S>
where
    A: Actuator,
    R: Receiver,
    S: ScanRecorder,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
