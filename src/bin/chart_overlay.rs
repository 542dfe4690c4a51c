use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chart_overlay::acquire::{AcquisitionPipeline, HttpTransport, YieldSnapshot};
use chart_overlay::api::{OverlayConfig, TickOutcome};
use chart_overlay::document::ChartDocument;
use chart_overlay::error::{OverlayError, OverlayResult};
use chart_overlay::telemetry;
use clap::{Parser, Subcommand};
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "chart-overlay", version)]
#[command(about = "Live yield marker for calibrated SVG charts")]
struct Cli {
    /// TOML configuration file, layered under CHART_OVERLAY_* variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the current reading once and write it as a JSON snapshot
    Fetch {
        /// Snapshot destination
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Instrument profile (us10y, us20y)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Keep the live marker on a chart up to date
    Watch {
        /// Chart location (file path or http(s) URL)
        #[arg(long)]
        chart: Option<String>,

        /// Where the chart with the marker is written after each update
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Poll interval in seconds
        #[arg(short, long)]
        interval: Option<f64>,

        /// Run the first tick only, then exit
        #[arg(long)]
        once: bool,
    },
    /// Print the pixel position of a domain pair on a chart
    Map {
        #[arg(long)]
        chart: String,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = telemetry::init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Fetch { output, profile } => fetch(cli.config.as_deref(), output, profile).await,
        Command::Watch {
            chart,
            output,
            interval,
            once,
        } => watch(cli.config.as_deref(), chart, output, interval, once).await,
        Command::Map { chart, x, y } => map(&chart, x, y).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn fetch(
    config_path: Option<&Path>,
    output: Option<PathBuf>,
    profile: Option<String>,
) -> OverlayResult<()> {
    let mut config = OverlayConfig::load(config_path)?;
    if let Some(profile) = profile {
        config.profile = profile;
        config = config.validate()?;
    }
    let output = output.unwrap_or_else(|| config.snapshot_output.clone());

    let pipeline = config.pipeline(HttpTransport::new()?)?;
    let observation = match pipeline.try_fetch_observation().await {
        Ok(observation) => observation,
        Err(err) => {
            log_report(&pipeline);
            return Err(err);
        }
    };

    YieldSnapshot::from_observation(&observation).write_atomic(&output)?;
    info!(
        path = %output.display(),
        value = observation.value(),
        change = observation.change(),
        "snapshot written"
    );
    Ok(())
}

async fn watch(
    config_path: Option<&Path>,
    chart: Option<String>,
    output: Option<PathBuf>,
    interval: Option<f64>,
    once: bool,
) -> OverlayResult<()> {
    let mut config = OverlayConfig::load(config_path)?;
    if let Some(interval) = interval {
        config.poll_interval_secs = interval;
        config = config.validate()?;
    }
    let location = chart
        .or_else(|| config.chart_path.clone())
        .ok_or_else(|| OverlayError::Config("no chart given (--chart or chart_path)".to_owned()))?;
    let output = output.unwrap_or_else(|| config.svg_output.clone());

    let transport = HttpTransport::new()?;
    let document = ChartDocument::load_or_placeholder(transport.client(), &location).await;
    let calibration = document.calibration().copied();
    if calibration.is_none() {
        warn!(%location, "chart has no usable calibration, marker cannot be placed");
    }
    // Publish the drawing right away so the output exists before the first reading.
    document.save(&output)?;

    let surface = Arc::new(Mutex::new(document));
    let pipeline = Arc::new(config.pipeline(transport)?);
    let scheduler = config.scheduler()?;

    if once {
        let outcome = scheduler
            .tick_once(pipeline.as_ref(), surface.as_ref(), calibration.as_ref())
            .await;
        return match outcome {
            TickOutcome::Rendered(_) => surface.lock().await.save(&output),
            other => {
                log_report(&pipeline);
                Err(OverlayError::InvalidData(format!("no marker rendered: {other:?}")))
            }
        };
    }

    let (outcomes_tx, mut outcomes) = mpsc::unbounded_channel();
    let handle = scheduler
        .with_outcomes(outcomes_tx)
        .start(Arc::clone(&pipeline), Arc::clone(&surface), calibration);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            outcome = outcomes.recv() => match outcome {
                Some(TickOutcome::Rendered(point)) => {
                    if let Err(err) = surface.lock().await.save(&output) {
                        warn!(error = %err, "failed to write chart");
                    } else {
                        info!(x = point.x, y = point.y, path = %output.display(), "marker updated");
                    }
                }
                Some(TickOutcome::Unavailable) => log_report(&pipeline),
                Some(_) => {}
                None => break,
            },
            _ = &mut ctrl_c => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}

async fn map(location: &str, x: f64, y: f64) -> OverlayResult<()> {
    let transport = HttpTransport::new()?;
    let document = ChartDocument::load_or_placeholder(transport.client(), location).await;
    let calibration = document.calibration().ok_or_else(|| {
        OverlayError::InvalidData(format!("{location} carries no usable xlm/ylm calibration"))
    })?;
    let point = calibration.to_pixel(x, y);
    println!("{} {}", point.x, point.y);
    Ok(())
}

fn log_report(pipeline: &AcquisitionPipeline<HttpTransport>) {
    let Some(report) = pipeline.last_report() else {
        return;
    };
    match serde_json::to_string(&report) {
        Ok(json) => warn!(report = %json, "acquisition diagnostics"),
        Err(err) => warn!(error = %err, "failed to serialize acquisition report"),
    }
}
