//! Run command handler
//!
//! Loads the configuration and keyword catalog, reads the ticket batch
//! from a JSON file, drives the batch runner against the in-memory record
//! store, and writes the run report plus the error CSV.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::batch::{write_error_csv, BatchReport, BatchRunner, ExitStatus};
use crate::cli::RunArgs;
use crate::config::{vendor_map, TriageConfig};
use crate::dispatch::WindowClock;
use crate::flags::RuleCatalog;
use crate::rank::ProvidedRankPredictor;
use crate::store::memory::LedgerEntry;
use crate::store::{MemoryStore, NullResolver};
use crate::ticket::{TeamId, Ticket};

/// Shape of the ticket batch input file.
#[derive(Debug, Deserialize)]
pub struct RunInput {
    /// Team owning created proposal records. Absence is a batch-level
    /// configuration error, mirroring the record store contract.
    #[serde(default)]
    pub team: Option<TeamId>,
    pub tickets: Vec<Ticket>,
    /// Pre-existing allocation history entries.
    #[serde(default)]
    pub history: Vec<LedgerEntry>,
}

/// Handle `triage run`.
pub fn handle_run(args: &RunArgs) -> anyhow::Result<ExitStatus> {
    let mut config = TriageConfig::load(Some(&args.config))
        .with_context(|| format!("loading {}", args.config.display()))?
        .with_env_overrides();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    crate::logging::init(&config.logging);
    config.validate().context("invalid configuration")?;

    let catalog = RuleCatalog::load(&config.catalog.dir, vendor_map(&config.profiles))
        .context("loading keyword catalog")?;
    let directory = config.directory.build();

    let input = read_input(&args.input)?;
    let store = MemoryStore::new(input.team).with_history(input.history);
    let mut tickets: Vec<Ticket> = input.tickets;

    let upstream = if args.upstream_warning {
        ExitStatus::Warning
    } else {
        ExitStatus::Success
    };

    let predictor = ProvidedRankPredictor;
    let resolver = NullResolver;
    let runner = BatchRunner::new(
        &catalog,
        &directory,
        &predictor,
        &store,
        &resolver,
        &resolver,
        WindowClock::new(config.batch.cutover_hour_utc),
    );

    let now = chrono::Utc::now();
    let report = runner.run(&mut tickets, now, upstream);

    if !report.failures.is_empty() {
        std::fs::create_dir_all(&config.batch.data_dir)
            .with_context(|| format!("creating {}", config.batch.data_dir.display()))?;
        let path = write_error_csv(&config.batch.data_dir, now, &report.failures)
            .context("writing error CSV")?;
        info!(path = %path.display(), "failed tickets exported");
    }

    write_report(args.output.as_deref(), &report)?;
    Ok(report.status)
}

fn read_input(path: &Path) -> anyhow::Result<RunInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn write_report(output: Option<&Path>, report: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{}", json),
    }
    Ok(())
}
