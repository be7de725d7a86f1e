use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{Overrides, WorkflowConfig};
use workflow::runner::Runner;

mod devices;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Radio telescope scan driver with simulated hardware")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long)]
    azimuth: Option<f64>,
    #[arg(long)]
    elevation: Option<f64>,
    #[arg(long)]
    start_hz: Option<f64>,
    #[arg(long)]
    stop_hz: Option<f64>,
    #[arg(long)]
    steps: Option<usize>,
    #[arg(long)]
    settle_ms: Option<u64>,
    /// CSV table the scan appends to
    #[arg(long)]
    output: Option<PathBuf>,
    /// Run the configured scan once and print a summary
    #[arg(long, default_value_t = false)]
    once: bool,
    /// Keep the HTTP bridge alive for scan commands until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = gui_bind_address())]
    bind: SocketAddr,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            azimuth: self.azimuth,
            elevation: self.elevation,
            start_hz: self.start_hz,
            stop_hz: self.stop_hz,
            steps: self.steps,
            settle_ms: self.settle_ms,
            output: self.output.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?.with_overrides(&args.overrides())?,
        None => WorkflowConfig::from_args(&args.overrides())?,
    };

    let runner = Runner::new(workflow_config);
    let service = Arc::new(runner.build_service()?);
    let gui_bridge = GuiBridge::new(service.clone());

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;

    let once = args.once || !args.serve;
    let outcome = runtime.block_on(async {
        if args.serve {
            let _server = gui_bridge.serve(args.bind);
            gui_bridge.publish_status(&format!("HTTP bridge on {}", args.bind));
        }

        let watcher = service.clone();
        let ctrl_c = tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                watcher.stop();
            }
        });

        if once {
            let scan_runner = runner.clone();
            let scan_service = service.clone();
            let result =
                tokio::task::spawn_blocking(move || scan_runner.execute(&scan_service))
                    .await
                    .context("joining scan task")??;

            println!(
                "Scan -> {}/{} steps, last frequency {:?} Hz, output {}",
                result.steps_completed,
                result.total_steps,
                result.last_frequency_hz,
                result.output.display()
            );
            if let Some(strongest) = result.strongest {
                println!(
                    "Strongest record: {} Hz at az {} el {} (peak {:.4e})",
                    strongest.frequency_hz,
                    strongest.azimuth,
                    strongest.elevation,
                    strongest.peak_power
                );
            }
            gui_bridge.publish_status("Scan results ready.");
        }

        if args.serve {
            gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
            ctrl_c.await.context("awaiting Ctrl+C to exit")?;
        } else {
            ctrl_c.abort();
        }
        Ok::<(), anyhow::Error>(())
    });

    service.shutdown();
    outcome
}
