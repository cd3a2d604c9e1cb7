//! SPEAR mission runtime demo CLI.
//!
//! Plays a mission plan against the simulated rover in `spear-sim` and prints
//! the outcome of every step.
//!
//! Usage:
//!   cargo run -p demo -- sample
//!   cargo run -p demo -- run --plan demo/missions/sample.plan --config demo/config/mission.toml
//!   cargo run -p demo -- run --plan demo/missions/sample.plan --cancel-after-ms 800

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spear_config::{plan::load_plan, MissionConfig};
use spear_contracts::{
    error::{MissionError, MissionResult},
    execution::SequencerStatus,
    step::MissionPlan,
};
use spear_core::MissionSequencer;
use spear_sim::{run_mission, MissionReport, SimBus, SimSettings};
use spear_states::{MissionStateFactory, StateContext};

const SAMPLE_PLAN: &str = include_str!("../missions/sample.plan");

// ── CLI definition ────────────────────────────────────────────────────────────

/// SPEAR mission state runtime demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "SPEAR mission runtime demo",
    long_about = "Plays a mission plan step by step against a simulated rover:\n\
                  scripted action server, GPS to UTM service, and timers on a virtual clock."
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. info, debug).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a plan file (line format, or TOML with a `.toml` extension).
    Run {
        #[arg(long)]
        plan: PathBuf,
        /// Mission configuration; may also carry a `[sim]` table.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Cancel the active step at this virtual time.
        #[arg(long)]
        cancel_after_ms: Option<u64>,
    },
    /// Run the built-in sample plan with default configuration.
    Sample,
}

/// The part of the configuration file only the demo reads.
#[derive(Debug, Default, Deserialize)]
struct SimFile {
    #[serde(default)]
    sim: SimSettings,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let result = match cli.command {
        Command::Run {
            plan,
            config,
            cancel_after_ms,
        } => run(&plan, config.as_deref(), cancel_after_ms.map(Duration::from_millis)),
        Command::Sample => {
            MissionPlan::parse(SAMPLE_PLAN).and_then(|plan| {
                play(plan, MissionConfig::default(), SimSettings::default(), None)
            })
        }
    };

    match result {
        Ok(report) => print_report(&report),
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Mission dispatch ──────────────────────────────────────────────────────────

fn run(plan: &Path, config: Option<&Path>, cancel_after: Option<Duration>) -> MissionResult<MissionReport> {
    info!(plan = %plan.display(), "loading plan");
    let plan = load_plan(plan)?;
    let (config, sim) = match config {
        Some(path) => (MissionConfig::from_file(path)?, load_sim_settings(path)?),
        None => (MissionConfig::default(), SimSettings::default()),
    };
    play(plan, config, sim, cancel_after)
}

fn load_sim_settings(path: &Path) -> MissionResult<SimSettings> {
    let text = std::fs::read_to_string(path).map_err(|e| MissionError::ConfigError {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    let file: SimFile = toml::from_str(&text).map_err(|e| MissionError::ConfigError {
        reason: format!("invalid [sim] table: {}", e),
    })?;
    Ok(file.sim)
}

fn play(
    plan: MissionPlan,
    config: MissionConfig,
    sim: SimSettings,
    cancel_after: Option<Duration>,
) -> MissionResult<MissionReport> {
    print_plan(&plan);

    let bus = SimBus::new(sim);
    let ctx = StateContext::new(bus.channel(), bus.transform(), bus.scheduler(), config);
    let factory = MissionStateFactory::new(ctx);
    let mut sequencer = MissionSequencer::new(Box::new(factory), plan);

    run_mission(&mut sequencer, &bus, cancel_after)
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_plan(plan: &MissionPlan) {
    println!();
    println!("SPEAR Mission Runtime Demo");
    println!("==========================");
    println!();
    println!("Plan ({} steps):", plan.len());
    for (index, step) in plan.steps.iter().enumerate() {
        println!("  [{}] {} {}", index, step.action, step.parameters);
    }
    println!();
}

fn print_report(report: &MissionReport) {
    println!("Steps:");
    for record in &report.records {
        println!(
            "  [{}] {:<10} {}",
            record.index,
            record.status.to_string(),
            record.description
        );
    }
    println!();

    let outcome = match &report.status {
        SequencerStatus::Complete => "mission complete".to_string(),
        SequencerStatus::Halted { step, status } => format!("mission halted at step {} ({})", step, status),
        SequencerStatus::Running { step } if report.stalled => {
            format!("mission stalled at step {}: no response from the bus", step)
        }
        SequencerStatus::Running { step } => format!("mission still running at step {}", step),
    };
    println!("Outcome: {} after {} ms of simulated time.", outcome, report.elapsed.as_millis());
}
