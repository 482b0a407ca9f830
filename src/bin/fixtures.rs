//! Fixtures CLI Tool
//!
//! Offline command-line tool for pairing a roster file and exporting the
//! resulting fixtures table without running the service.
//!
//! Usage:
//!   cargo run --bin fixtures -- --help
//!   cargo run --bin fixtures show --roster roster.json --seed 42
//!   cargo run --bin fixtures export --roster roster.json --policy bye --output fixtures.csv
//!   cargo run --bin fixtures export --roster roster.json --start

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use court_rotation::pairing::{PairingScheduler, RosterProvider, SchedulerConfig};
use court_rotation::utils::{current_timestamp, fixtures_filename};
use court_rotation::{MatchState, OddParticipantPolicy, StaticRosterProvider};

#[derive(Parser)]
#[command(name = "fixtures")]
#[command(about = "Pair a roster file onto courts and export the fixtures table")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// JSON roster file (array of participants)
    #[arg(short, long)]
    roster: PathBuf,

    /// Seed for a reproducible pairing
    #[arg(short, long)]
    seed: Option<u64>,

    /// Odd participant policy (queue or bye)
    #[arg(short, long, default_value = "queue")]
    policy: OddParticipantPolicy,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the court assignments
    Show {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Export the fixtures table as CSV
    Export {
        #[command(flatten)]
        run: RunArgs,

        /// Mark every match as in progress before exporting
        #[arg(long)]
        start: bool,

        /// Write to this file instead of stdout; a directory gets the dated file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn build_scheduler(args: &RunArgs) -> Result<PairingScheduler> {
    let provider = StaticRosterProvider::from_file(&args.roster)?;
    let roster = provider.snapshot()?;

    let config = SchedulerConfig::with_policy(args.policy);
    let mut scheduler = match args.seed {
        Some(seed) => PairingScheduler::with_seed(config, seed),
        None => PairingScheduler::new(config),
    };

    scheduler.generate(&roster)?;
    Ok(scheduler)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { run } => {
            let scheduler = build_scheduler(&run)?;
            let summary = scheduler.summary()?;

            if let Some(current) = scheduler.current_run() {
                for m in current.matches() {
                    println!(
                        "🏸 Court {}: {} vs {} ({} serves)",
                        m.court_number(),
                        m.participant_a().display_name,
                        m.participant_b().display_name,
                        m.server().display_name
                    );
                }
                for waiting in current.queue().iter() {
                    println!("⏳ Queued: {}", waiting.display_name);
                }
                if let Some(bye) = current.bye() {
                    println!("☕ Bye: {}", bye.display_name);
                }
            }

            println!(
                "✅ Created {} matches, {} queued, {} bye",
                summary.matches, summary.queued, summary.byes
            );
        }

        Commands::Export { run, start, output } => {
            let mut scheduler = build_scheduler(&run)?;

            if start {
                let ids: Vec<_> = scheduler
                    .current_run()
                    .map(|r| r.matches().iter().map(|m| m.id()).collect())
                    .unwrap_or_default();
                for id in ids {
                    scheduler.transition(id, MatchState::InProgress)?;
                }
            }

            let csv = scheduler.export_run()?;

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(fixtures_filename(current_timestamp().date_naive()))
                    } else {
                        path
                    };
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("✅ Fixtures written to {}", path.display());
                }
                None => print!("{}", csv),
            }
        }
    }

    Ok(())
}
