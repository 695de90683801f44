#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Voxel Tactics session.
//!
//! The adapter generates terrain, places the opening roster and replays a
//! key script against the first unit, printing what a renderer would show.

mod config;
mod playback;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use glam::IVec3;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use voxel_tactics_core::{Command, Event};
use voxel_tactics_rendering::{CameraRotation, SceneRecorder, WorldMapping};
use voxel_tactics_system_bootstrap::Bootstrap;
use voxel_tactics_system_movement::Movement;
use voxel_tactics_system_terrain::{materialize, PerlinNoise, TerrainGenerator};
use voxel_tactics_world::{self as world, World};

use crate::config::Config;

/// Edge length used when neither the flags nor the configuration set one.
const DEFAULT_SIZE: u32 = 16;

/// Generate a voxel battlefield and replay scripted movement input.
#[derive(Debug, Parser)]
#[command(name = "voxel-tactics", version)]
struct Args {
    /// Edge length of the square terrain grid.
    #[arg(long)]
    size: Option<u32>,
    /// Terrain seed; a random seed is drawn and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML configuration file with `[terrain]`, `[movement]`, `[keys]` and `[roster]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Whitespace-separated keys delivered to the first unit; `space` confirms.
    #[arg(long, default_value = "")]
    keys: String,
    /// Counter-clockwise quarter turns applied to the camera.
    #[arg(long, default_value_t = 0)]
    camera_turns: u8,
    /// Scripted time between consecutive keys, in milliseconds.
    #[arg(long, default_value_t = 200)]
    key_interval_ms: u64,
}

/// Entry point for the Voxel Tactics command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let bindings = config.key_bindings()?;

    let size = args.size.or(config.terrain.size).unwrap_or(DEFAULT_SIZE);
    let seed = match args.seed.or(config.terrain.seed) {
        Some(seed) => seed,
        None => {
            let seed = rand::random();
            info!(seed, "no seed supplied, drew a random one");
            seed
        }
    };

    let generator = TerrainGenerator::new(PerlinNoise::new(seed), config.terrain_tuning());
    let grid = generator
        .generate(size)
        .with_context(|| format!("failed to generate terrain of size {size} from seed {seed}"))?;
    info!(size, seed, present_columns = grid.present_columns(), "terrain generated");

    let mut scene = SceneRecorder::new();
    let terrain = materialize(&grid, &mut scene);
    let mapping = WorldMapping::new(size, IVec3::ZERO, 1.0).context("invalid world mapping")?;

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::InstallTerrain { terrain: grid }, &mut events);

    let bootstrap = Bootstrap::new(config.roster_tuning());
    for command in bootstrap.plan_roster(&world, seed) {
        world::apply(&mut world, command, &mut events);
    }
    for event in &events {
        if let Event::UnitPlacementRejected {
            team,
            role,
            position,
            reason,
        } = event
        {
            warn!(?team, ?role, ?position, ?reason, "roster placement rejected");
        }
    }

    println!("{}", bootstrap.welcome_banner(&world));
    println!(
        "Terrain {size}x{size} from seed {seed}: {} solids",
        terrain.solids().len()
    );

    let units = bootstrap.units(&world);
    for unit in units.iter() {
        let location = mapping.to_world(unit.position);
        println!(
            "  unit {} {:?} {:?} at ({}, {}, {}) -> world {location}",
            unit.id.get(),
            unit.team,
            unit.role,
            unit.position.x(),
            unit.position.y(),
            unit.position.z()
        );
    }

    let keys = playback::parse_key_script(&args.keys);
    match units.iter().next() {
        Some(unit) if !keys.is_empty() => {
            let mut movement = Movement::new(config.movement_tuning(), bindings);
            let camera = CameraRotation::new(args.camera_turns);
            let report = playback::play(
                &mut world,
                &mut movement,
                &mut scene,
                &camera,
                &mapping,
                unit,
                &keys,
                Duration::from_millis(args.key_interval_ms),
            )?;
            println!("Unit {}: {report}", unit.id.get());
        }
        Some(_) => {}
        None => warn!("terrain has no ground for the roster"),
    }

    println!("Scene: {}", scene.summary());
    terrain.teardown(&mut scene);
    Ok(())
}
