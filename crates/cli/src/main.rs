use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gridbench::{run_phase, Phase, WorkloadConfig};
use gridbench_bindings::BindingFactory;
use gridbench_core::{PropertiesLoader, LOG_ENV_VAR};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gridbench")]
#[command(author, version, about = "YCSB-style benchmark driver for key-value store bindings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the initial record set
    Load(PhaseArgs),
    /// Run the transaction mix against loaded records
    Run(PhaseArgs),
}

#[derive(Args, Debug)]
struct PhaseArgs {
    /// Binding to benchmark (grid, named, remote)
    #[arg(long, default_value = "grid")]
    db: String,

    /// Properties file
    #[arg(short = 'P', value_name = "FILE")]
    properties_file: Option<PathBuf>,

    /// Property assignment, may be repeated
    #[arg(short = 'p', value_name = "NAME=VALUE")]
    properties: Vec<String>,

    /// Number of workers, overrides `threadcount`
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for the workload generator
    #[arg(long)]
    seed: Option<u64>,

    /// Run the load phase first in the same process; in-process stores
    /// start empty
    #[arg(long)]
    preload: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level used when the log environment variable is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log level")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (phase, args) = match cli.command {
        Command::Load(args) => (Phase::Load, args),
        Command::Run(args) => (Phase::Run, args),
    };

    init_tracing(&args.log_level)?;

    let mut assignments = args.properties.clone();
    if let Some(threads) = args.threads {
        assignments.push(format!("threadcount={threads}"));
    }
    let props = PropertiesLoader::load(args.properties_file.as_deref(), &assignments)
        .context("failed to load properties")?;

    let workload = Arc::new(WorkloadConfig::from_properties(&props)?);
    let factory = BindingFactory::new(&args.db, &props)?;
    info!(binding = %factory.kind(), phase = phase.name(), "benchmark configured");

    let mut reports = Vec::with_capacity(2);
    if phase == Phase::Run && args.preload {
        reports.push(run_phase(Phase::Load, &factory, Arc::clone(&workload), args.seed).await?);
    }
    reports.push(run_phase(phase, &factory, workload, args.seed).await?);
    factory.shutdown();

    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            print!("{report}");
        }
    }
    Ok(())
}
