// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Runs a rebound scene for a fixed number of steps and prints the final
//! state hash with the last step's statistics.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rebound_core::{BroadPhaseKind, StepStats, World};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::scene::Scene;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BroadPhaseArg {
    BruteForce,
    SweepAndPrune,
}

impl From<BroadPhaseArg> for BroadPhaseKind {
    fn from(arg: BroadPhaseArg) -> Self {
        match arg {
            BroadPhaseArg::BruteForce => Self::BruteForce,
            BroadPhaseArg::SweepAndPrune => Self::SweepAndPrune,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Step a rigid-body scene and report its final state")]
struct Args {
    /// Scene JSON file. The built-in demo runs when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,
    /// Number of fixed steps to run.
    #[arg(long, default_value_t = 300)]
    steps: u64,
    /// Override the scene's broad phase.
    #[arg(long, value_enum)]
    broad_phase: Option<BroadPhaseArg>,
    /// Override the constraint shuffle seed.
    #[arg(long)]
    seed: Option<u32>,
    /// Solve constraints in insertion order instead of shuffling.
    #[arg(long)]
    no_randomizer: bool,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
    /// Print the demo scene as JSON and exit.
    #[arg(long)]
    dump_demo: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    steps: u64,
    state_hash: String,
    stats: StepStats,
}

fn load(args: &Args) -> Result<Scene> {
    match &args.scene {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read scene {}", path.display()))?;
            Scene::from_json(&text).with_context(|| format!("load scene {}", path.display()))
        }
        None => Ok(scene::demo()),
    }
}

fn run(world: &mut World, steps: u64) {
    for _ in 0..steps {
        world.step();
        let stats = world.stats();
        debug!(
            step = stats.step,
            contacts = stats.contacts,
            islands = stats.islands,
            sleeping = stats.sleeping_bodies,
            "stepped"
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    if args.dump_demo {
        println!("{}", serde_json::to_string_pretty(&scene::demo())?);
        return Ok(());
    }

    let scene = load(&args)?;
    let mut config = scene.config;
    if let Some(kind) = args.broad_phase {
        config.broad_phase = kind.into();
    }
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if args.no_randomizer {
        config.enable_randomizer = false;
    }

    let mut world = scene.build(config)?;
    info!(steps = args.steps, broad_phase = ?config.broad_phase, "running");
    run(&mut world, args.steps);

    let report = Report {
        steps: world.steps(),
        state_hash: hex::encode(world.state_hash()),
        stats: *world.stats(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let stats = &report.stats;
        println!("steps      {}", report.steps);
        println!("state_hash {}", report.state_hash);
        println!("bodies     {} ({} sleeping)", stats.bodies, stats.sleeping_bodies);
        println!("contacts   {} ({} touching, {} points)", stats.contacts, stats.touching_contacts, stats.contact_points);
        println!("islands    {}", stats.islands);
        println!("pair tests {}", stats.pair_checks);
    }
    Ok(())
}
