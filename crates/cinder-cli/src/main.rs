//! Cinder CLI - headless runner for the Cinder simulation core

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{effects, run};

#[derive(Parser)]
#[command(name = "cinder")]
#[command(about = "Headless 2D particle, projectile and attack pattern simulation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation loop and print stats once per game second
    Run {
        /// Path to a simulation config (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Number of frames to simulate
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Host seconds per frame
        #[arg(long, default_value = "0.016", value_parser = parse_dt)]
        dt: f64,

        /// Effect to play at the screen center (repeatable)
        #[arg(long = "effect")]
        effects: Vec<String>,

        /// Start the radial sweep attack pattern
        #[arg(long)]
        pattern: bool,

        /// Override the RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List and validate the templates in an effects file
    Effects {
        /// Path to a TOML file with [effects.<name>] tables
        file: String,
    },
}

fn parse_dt(s: &str) -> Result<f64, String> {
    let dt: f64 = s.parse().map_err(|e| format!("invalid dt: {}", e))?;
    if dt.is_finite() && dt > 0.0 {
        Ok(dt)
    } else {
        Err(format!("dt must be a positive number of seconds, got {}", s))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            frames,
            dt,
            effects,
            pattern,
            seed,
            format,
        } => run::run(run::RunArgs {
            config,
            frames,
            dt,
            effects,
            pattern,
            seed,
            format,
        }),
        Commands::Effects { file } => effects::run(&file),
    }
}
