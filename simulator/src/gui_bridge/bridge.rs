use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::SimulatedService;
use log::{error, info};
use scancore::controller::ScanRequest;
use scancore::prelude::{ScanError, SweepSpec};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread::{self, JoinHandle},
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Body of `POST /scan`; the configured sweep is used when `sweep` is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanCommand {
    pub azimuth: f64,
    pub elevation: f64,
    #[serde(default)]
    pub sweep: Option<SweepSpec>,
}

/// HTTP front end over the scan service: status polling plus start and stop commands.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
    service: Arc<SimulatedService>,
}

impl GuiBridge {
    pub fn new(service: Arc<SimulatedService>) -> Self {
        let state = Arc::new(RwLock::new(VisualizationModel::new()));
        let events = service.subscribe();
        let pump_state = state.clone();
        thread::spawn(move || {
            for event in events {
                match pump_state.write() {
                    Ok(mut model) => model.apply(&event),
                    Err(_) => break,
                }
            }
        });
        Self { state, service }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let service = self.service.clone();
        let state_filter = warp::any().map(move || state.clone());
        let service_filter = warp::any().map(move || service.clone());

        let status_route = warp::path("status")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter)
            .and(service_filter.clone())
            .map(
                |state: Arc<RwLock<VisualizationModel>>, service: Arc<SimulatedService>| {
                    let mut model = state.read().map(|m| m.clone()).unwrap_or_default();
                    model.status = service.status();
                    model.metrics = service.metrics();
                    warp::reply::json(&model)
                },
            );

        let scan_route = warp::path("scan")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(service_filter.clone())
            .map(|command: ScanCommand, service: Arc<SimulatedService>| {
                let sweep = command.sweep.unwrap_or_else(|| service.default_sweep());
                let request = ScanRequest::new(command.azimuth, command.elevation, sweep);
                match service.start(request) {
                    Ok(()) => {
                        println!(
                            "[GUI] Scan started at az {} el {}",
                            command.azimuth, command.elevation
                        );
                        warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "started",
                                "total_steps": sweep.step_count
                            })),
                            StatusCode::ACCEPTED,
                        )
                    }
                    Err(err) => {
                        let code = match err {
                            ScanError::ScanInProgress => StatusCode::CONFLICT,
                            ScanError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
                            _ => StatusCode::INTERNAL_SERVER_ERROR,
                        };
                        eprintln!("scan request rejected: {}", err);
                        warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "rejected",
                                "error": err.to_string()
                            })),
                            code,
                        )
                    }
                }
            });

        let stop_route = warp::path("stop")
            .and(warp::path::end())
            .and(warp::post())
            .and(service_filter)
            .map(|service: Arc<SimulatedService>| {
                let active = service.is_active();
                service.stop();
                warp::reply::json(&json!({ "status": "stopping", "active": active }))
            });

        status_route.or(scan_route).or(stop_route)
    }

    /// Serves [`GuiBridge::routes`] on `addr` from a dedicated thread.
    pub fn serve(&self, addr: SocketAddr) -> JoinHandle<()> {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            info!("GUI bridge listening on {}", addr);
            runtime.block_on(async move {
                warp::serve(routes).run(addr).await;
            });
        })
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        let mut model = self.state.read().map(|m| m.clone()).unwrap_or_default();
        model.status = self.service.status();
        model.metrics = self.service.metrics();
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::WorkflowConfig;
    use crate::workflow::runner::Runner;
    use scancore::controller::ScanState;
    use serde_json::Value;
    use tempfile::tempdir;

    fn bridge(output: std::path::PathBuf, read_latency_ms: u64) -> GuiBridge {
        let mut cfg = WorkflowConfig::default();
        cfg.output = output;
        cfg.scan.settle_ms = 0;
        cfg.scan.block_length = 256;
        cfg.scan.sweep = SweepSpec::new(1419e6, 1421e6, 3).unwrap();
        cfg.simulation.read_latency_ms = read_latency_ms;
        let service = Runner::new(cfg).build_service().unwrap();
        GuiBridge::new(Arc::new(service))
    }

    #[tokio::test]
    async fn scan_command_starts_and_rejects_overlap() {
        let dir = tempdir().unwrap();
        let gui = bridge(dir.path().join("scan.csv"), 200);
        let routes = gui.routes();

        let started = warp::test::request()
            .method("POST")
            .path("/scan")
            .json(&json!({"azimuth": 90.0, "elevation": 45.0}))
            .reply(&routes)
            .await;
        assert_eq!(started.status(), StatusCode::ACCEPTED);

        let overlap = warp::test::request()
            .method("POST")
            .path("/scan")
            .json(&json!({"azimuth": 10.0, "elevation": 10.0}))
            .reply(&routes)
            .await;
        assert_eq!(overlap.status(), StatusCode::CONFLICT);

        let stopped = warp::test::request()
            .method("POST")
            .path("/stop")
            .reply(&routes)
            .await;
        assert_eq!(stopped.status(), StatusCode::OK);

        gui.service.wait().unwrap().unwrap_err();
        let status = warp::test::request().path("/status").reply(&routes).await;
        let body: Value = serde_json::from_slice(status.body()).unwrap();
        assert_eq!(body["status"]["state"], "idle");
        assert_eq!(body["status"]["last_outcome"]["state"], "aborted");
        assert_eq!(body["metrics"]["scans_aborted"], 1);
    }

    #[tokio::test]
    async fn invalid_scan_command_is_a_bad_request() {
        let dir = tempdir().unwrap();
        let gui = bridge(dir.path().join("scan.csv"), 0);
        let routes = gui.routes();

        let response = warp::test::request()
            .method("POST")
            .path("/scan")
            .json(&json!({"azimuth": 270.0, "elevation": 45.0}))
            .reply(&routes)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!gui.service.is_active());
    }

    #[test]
    fn completed_scan_reaches_the_model() {
        let dir = tempdir().unwrap();
        let gui = bridge(dir.path().join("scan.csv"), 0);
        gui.service.start_scan(90.0, 45.0).unwrap();
        gui.service.wait().unwrap().unwrap();

        let snapshot = gui.snapshot();
        assert_eq!(snapshot.status.state, ScanState::Idle);
        assert_eq!(snapshot.status.steps_completed, 3);
        assert_eq!(snapshot.metrics.scans_completed, 1);
    }
}
