//! Flurry CLI - headless driver for the particle simulation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flurry")]
#[command(about = "Burst-spawned settling particle simulation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless and print status lines
    Run {
        /// Config file (defaults to ./flurry.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated seconds to run
        #[arg(long, default_value = "70")]
        seconds: f64,

        /// Ticks per simulated second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Start a local burst session at startup
        #[arg(long)]
        burst: bool,

        /// Replay feed JSON file
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Fixed RNG seed (overrides config and FLURRY_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Seconds between status lines
        #[arg(long, default_value = "1")]
        status_every: f64,

        /// Pace ticks against the wall clock instead of running flat out
        #[arg(long)]
        realtime: bool,
    },

    /// Print the resolved configuration as TOML
    Config {
        /// Config file (defaults to ./flurry.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seconds,
            fps,
            burst,
            feed,
            seed,
            status_every,
            realtime,
        } => run::run(run::RunArgs {
            config,
            seconds,
            fps,
            burst,
            feed,
            seed,
            status_every,
            realtime,
        }),
        Commands::Config { config } => config::run(config.as_deref()),
    }
}
