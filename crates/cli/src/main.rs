//! tap-saasoptics entry point
//!
//! Two modes: `--discover` emits the annotated stream catalog to stdout;
//! otherwise a sync run extracts the catalog's selected streams and writes
//! RECORD/STATE messages to stdout. All diagnostics go to stderr, any fatal
//! error exits nonzero.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use saasoptics_core::SyncService;
use saasoptics_domain::{Catalog, Result, SyncMode, TapError, TapState};
use saasoptics_infra::api::{SaasOpticsClient, SaasOpticsClientConfig};
use saasoptics_infra::discover::write_catalog;
use saasoptics_infra::{config, discover, JsonLinesSink};

#[derive(Parser, Debug)]
#[command(
    name = "tap-saasoptics",
    version,
    about = "Extracts SaaSOptics records as a stream of RECORD and STATE messages"
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long)]
    config: PathBuf,

    /// Emit the annotated stream catalog to stdout and exit
    #[arg(long)]
    discover: bool,

    /// Path to the selected-streams catalog (required for a sync run)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to a prior checkpoint file
    #[arg(long)]
    state: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout is the data channel; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, resume = failure_resume_hint(&err), "tap failed");
            ExitCode::FAILURE
        }
    }
}

/// Operator guidance attached to the fatal-error log line.
fn failure_resume_hint(err: &TapError) -> &'static str {
    if err.preserves_checkpoint() {
        "STATE messages emitted before the failure are safe to resume from"
    } else {
        "configuration error before extraction; no STATE was emitted"
    }
}

async fn run(cli: Cli) -> Result<()> {
    let tap_config = config::load(&cli.config)?;

    if cli.discover {
        info!("starting discover");
        let catalog = discover::discover(Path::new(tap_config.schema_dir_or_default()))?;
        write_catalog(&catalog, std::io::stdout().lock())?;
        info!("finished discover");
        return Ok(());
    }

    let catalog_path = cli.catalog.ok_or_else(|| {
        TapError::Config("a sync run requires --catalog <path> (or pass --discover)".into())
    })?;
    let catalog = load_catalog(&catalog_path)?;
    let initial_state = load_state(cli.state.as_deref())?;

    let mode = tap_config.sync_mode();
    match mode {
        SyncMode::Full => info!("running in full-sync mode"),
        SyncMode::Incremental => info!("running in incremental-sync mode"),
    }

    let client = SaasOpticsClient::new(SaasOpticsClientConfig::from_tap_config(&tap_config))?;
    let service = SyncService::new(Arc::new(client));
    let mut sink = JsonLinesSink::new(std::io::stdout());

    service.run(&catalog, initial_state, mode, &mut sink).await?;
    Ok(())
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        TapError::Config(format!("failed to read catalog {}: {err}", path.display()))
    })?;
    serde_json::from_str(&contents)
        .map_err(|err| TapError::Config(format!("invalid catalog {}: {err}", path.display())))
}

fn load_state(path: Option<&Path>) -> Result<TapState> {
    let Some(path) = path else {
        return Ok(TapState::new());
    };
    let contents = std::fs::read_to_string(path).map_err(|err| {
        TapError::Config(format!("failed to read state {}: {err}", path.display()))
    })?;
    serde_json::from_str(&contents)
        .map_err(|err| TapError::Config(format!("invalid state {}: {err}", path.display())))
}
