//! Headless simulation run

use anyhow::{Context, Result};
use cinder_sim::{SimConfig, SimWorld, TickReport};
use std::path::Path;

pub struct RunArgs {
    pub config: Option<String>,
    pub frames: u64,
    pub dt: f64,
    pub effects: Vec<String>,
    pub pattern: bool,
    pub seed: Option<u64>,
    pub format: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Format {
    Text,
    Json,
}

pub fn run(args: RunArgs) -> Result<()> {
    let format = match args.format.as_str() {
        "text" => Format::Text,
        "json" => Format::Json,
        other => anyhow::bail!("Unknown format: {}", other),
    };

    let mut config = match &args.config {
        Some(path) => SimConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    log::debug!("[cli] seed {:#x}, bounds {:?}", config.seed, config.bounds);

    let mut world = SimWorld::new(config)?;
    let center = world.bounds().center();

    for name in &args.effects {
        world
            .spawn_effect(name, center)
            .with_context(|| format!("Failed to play effect '{}'", name))?;
    }
    if args.pattern {
        world.start_radial_sweep()?;
    }

    if format == Format::Text {
        println!(
            "Running {} frame(s) at dt={}s ({} effect(s){})",
            args.frames,
            args.dt,
            args.effects.len(),
            if args.pattern { ", radial sweep" } else { "" }
        );
        println!(
            "{:>8} {:>8} {:>10} {:>12} {:>8} {:>8}",
            "time", "frame", "particles", "projectiles", "effects", "scripts"
        );
    }

    let mut next_report = 1.0;
    let mut last = None;
    for _ in 0..args.frames {
        let report = world.tick(args.dt)?;
        // Paused game time never reaches the next mark; the host loop keeps going
        if report.time + 1e-9 >= next_report {
            emit(format, &report)?;
            next_report = report.time.floor() + 1.0;
        }
        last = Some(report);
    }

    let Some(report) = last else {
        return Ok(());
    };
    match format {
        Format::Json => emit(format, &report)?,
        Format::Text => {
            println!();
            println!("Finished at {:.3}s after {} frame(s)", report.time, report.frame);
            emit(format, &report)?;
            for stats in world.pools().stats() {
                println!(
                    "  pool {:<11} {:>5} / {:<5} active",
                    stats.kind, stats.active, stats.capacity
                );
            }
        }
    }
    Ok(())
}

fn emit(format: Format, report: &TickReport) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(report)?),
        Format::Text => println!(
            "{:>8.2} {:>8} {:>10} {:>12} {:>8} {:>8}",
            report.time,
            report.frame,
            report.particles,
            report.projectiles,
            report.effects,
            report.scripts
        ),
    }
    Ok(())
}
