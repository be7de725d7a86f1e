use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use crate::controller::events::{ScanEvent, StopToken};
use crate::controller::scan::{lock, ScanController};
use crate::controller::session::{ScanAbort, ScanReport, ScanRequest};
use crate::controller::state::ScanStatus;
use crate::hardware::{Actuator, Receiver};
use crate::prelude::{ScanError, ScanResult, SweepSpec};
use crate::storage::ScanRecorder;
use crate::telemetry::{MetricsRecorder, MetricsSnapshot};

type ScanHandle = JoinHandle<Result<ScanReport, ScanAbort>>;
type Subscribers = Arc<Mutex<Vec<Sender<ScanEvent>>>>;

/// Command interface in front of a [`ScanController`].
///
/// Scans run on a worker thread, one at a time. A start request while a scan
/// is active is rejected with [`ScanError::ScanInProgress`]; nothing is queued.
/// Dropping the service stops any running scan and releases the hardware.
pub struct ScanService<A, R, S>
where
    A: Actuator + 'static,
    R: Receiver + 'static,
    S: ScanRecorder + 'static,
{
    controller: Arc<Mutex<ScanController<A, R, S>>>,
    status: Arc<Mutex<ScanStatus>>,
    metrics: Arc<MetricsRecorder>,
    default_sweep: SweepSpec,
    active: Arc<AtomicBool>,
    closed: AtomicBool,
    stop: Mutex<StopToken>,
    worker: Mutex<Option<ScanHandle>>,
    subscribers: Subscribers,
}

impl<A, R, S> ScanService<A, R, S>
where
    A: Actuator + 'static,
    R: Receiver + 'static,
    S: ScanRecorder + 'static,
{
    pub fn new(controller: ScanController<A, R, S>) -> Self {
        Self {
            status: controller.status_handle(),
            metrics: controller.metrics(),
            default_sweep: controller.settings().sweep,
            controller: Arc::new(Mutex::new(controller)),
            active: Arc::new(AtomicBool::new(false)),
            closed: AtomicBool::new(false),
            stop: Mutex::new(StopToken::new()),
            worker: Mutex::new(None),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Starts a scan over the configured default sweep.
    pub fn start_scan(&self, azimuth: f64, elevation: f64) -> ScanResult<()> {
        self.start(ScanRequest::new(azimuth, elevation, self.default_sweep))
    }

    pub fn start(&self, request: ScanRequest) -> ScanResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ScanError::InvalidParameters(
                "scan service has been shut down".into(),
            ));
        }
        if self.active.load(Ordering::SeqCst) {
            return Err(ScanError::ScanInProgress);
        }
        request.validate()?;

        // The fresh token must be in place before the scan reads as active,
        // otherwise a concurrent stop() lands on the previous token.
        let stop = {
            let mut slot = lock(&self.stop);
            if self
                .active
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(ScanError::ScanInProgress);
            }
            let stop = StopToken::new();
            *slot = stop.clone();
            stop
        };

        if let Some(previous) = lock(&self.worker).take() {
            if previous.join().is_err() {
                warn!("previous scan worker panicked");
            }
        }

        let controller = self.controller.clone();
        let active = self.active.clone();
        let subscribers = self.subscribers.clone();
        info!(
            "starting scan at az {} el {}",
            request.azimuth, request.elevation
        );

        let handle = thread::spawn(move || {
            let observer = |event: &ScanEvent| broadcast(&subscribers, event);
            let result = lock(&controller).run_scan(&request, &stop, &observer);
            active.store(false, Ordering::SeqCst);
            result
        });
        *lock(&self.worker) = Some(handle);
        Ok(())
    }

    /// Asks the running scan to stop before its next step.
    pub fn stop(&self) {
        if self.is_active() {
            info!("stop requested");
        }
        lock(&self.stop).stop();
    }

    /// Blocks until the current scan finishes and returns its result.
    pub fn wait(&self) -> Option<Result<ScanReport, ScanAbort>> {
        let handle = lock(&self.worker).take()?;
        match handle.join() {
            Ok(result) => Some(result),
            Err(_) => {
                error!("scan worker panicked");
                self.active.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> ScanStatus {
        lock(&self.status).clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn default_sweep(&self) -> SweepSpec {
        self.default_sweep
    }

    /// Progress stream; the receiver sees every event from now on.
    pub fn subscribe(&self) -> mpsc::Receiver<ScanEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Stops any scan, waits for it, then releases the hardware. Later
    /// start requests are rejected.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.stop();
        let _ = self.wait();
        lock(&self.controller).shutdown();
    }
}

impl<A, R, S> Drop for ScanService<A, R, S>
where
    A: Actuator + 'static,
    R: Receiver + 'static,
    S: ScanRecorder + 'static,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn broadcast(subscribers: &Subscribers, event: &ScanEvent) {
    lock(subscribers).retain(|tx| tx.send(event.clone()).is_ok());
}
