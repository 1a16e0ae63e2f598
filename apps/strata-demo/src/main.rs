//! Strata headless demo.
//!
//! Walks a viewer across procedurally generated terrain, streaming chunks
//! around it, digging and building along the way and switching dimension
//! halfway through. Progress is reported through `tracing`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p strata-demo -- [OPTIONS]
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use std::time::{Duration, Instant};

use glam::Vec3;
use strata_core::math::Ray;
use strata_core::BlockId;
use strata_world::{ChunkState, DimensionConfig, TerrainConfig, World, WorldConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Distance walked per tick.
const WALK_SPEED: f32 = 0.75;
/// Eye height above the standable surface.
const EYE_HEIGHT: f32 = 1.5;
/// Ticks between edits.
const EDIT_INTERVAL: usize = 25;
const DIG_REACH: f32 = 10.0;
const BUILD_REACH: f32 = 5.0;

struct Options {
    seed: u32,
    dimension: u32,
    radius: i32,
    steps: usize,
    background: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 0,
            dimension: 0,
            radius: 3,
            steps: 200,
            background: false,
        }
    }
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                if let Some(seed) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    options.seed = seed;
                }
                i += 1;
            }
            "--dimension" => {
                if let Some(id) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    options.dimension = id;
                }
                i += 1;
            }
            "--radius" => {
                if let Some(radius) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    options.radius = radius;
                }
                i += 1;
            }
            "--steps" => {
                if let Some(steps) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    options.steps = steps;
                }
                i += 1;
            }
            "--async" => options.background = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => warn!("Ignoring unknown argument {other}"),
        }
        i += 1;
    }

    options
}

fn print_help() {
    eprintln!(
        "Strata headless terrain demo

USAGE:
    cargo run -p strata-demo -- [OPTIONS]

OPTIONS:
    --seed <N>        World seed (default: 0)
    --dimension <ID>  Starting dimension preset, 0-6 (default: 0)
    --radius <N>      Render radius in chunks (default: 3)
    --steps <N>       Number of simulation ticks (default: 200)
    --async           Generate chunks on a background thread
    -h, --help        Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG          Set log level (e.g., info, debug, trace)"
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args();
    let dimension = DimensionConfig::by_id(options.dimension).unwrap_or_else(|| {
        warn!(id = options.dimension, "Unknown dimension, using the default");
        DimensionConfig::default()
    });
    let config = WorldConfig {
        render_radius: options.radius,
        ..Default::default()
    };
    let terrain = TerrainConfig {
        seed: options.seed,
        ..Default::default()
    };

    let mut world = if options.background {
        World::with_background_generation(config, terrain, dimension)?
    } else {
        World::new(config, terrain, dimension)?
    };

    let start = Instant::now();
    let mut position = Vec3::new(0.5, 0.0, 0.5);
    let mut dug = 0;
    let mut built = 0;

    for step in 0..options.steps {
        position.x += WALK_SPEED;
        position.z += WALK_SPEED * 0.25 * (step as f32 * 0.05).sin();
        position.y = world.terrain_height(position.x, position.z);

        world.update(position);

        if step == options.steps / 2 {
            let next = (world.dimension().id + 1) % DimensionConfig::presets().len() as u32;
            if let Some(next) = DimensionConfig::by_id(next) {
                world.set_dimension(next)?;
            }
        }

        if step % EDIT_INTERVAL == EDIT_INTERVAL - 1 {
            let eye = position + Vec3::Y * EYE_HEIGHT;
            let ray = Ray::looking_at(eye, eye + Vec3::new(2.0, -1.0, 0.0));

            if let Some(target) = world.pick_block(&ray, DIG_REACH) {
                if let Ok(block) = world.remove(target) {
                    dug += 1;
                    info!(x = target.x, y = target.y, z = target.z, %block, "Dug");
                }
            }
            if let Some(target) = world.pick_placement(&ray, BUILD_REACH) {
                if world.place(target, BlockId::STONE).is_ok() {
                    built += 1;
                }
            }
        }
    }

    // Let the background worker catch up before reporting.
    if world.is_background() {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !world.store().positions_in_state(ChunkState::Pending).is_empty()
            && Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(10));
            world.update(position);
        }
    }

    let store = world.store();
    let meshed = store.iter().filter(|chunk| chunk.is_meshed()).count();
    let (vertices, triangles) = store
        .iter()
        .filter_map(|chunk| chunk.mesh())
        .fold((0, 0), |(v, t), mesh| {
            (v + mesh.vertex_count(), t + mesh.triangle_count())
        });

    info!(
        dimension = %world.dimension().name,
        chunks = store.len(),
        capacity = store.capacity(),
        meshed,
        vertices,
        triangles,
        memory_kib = store.memory_usage() / 1024,
        dug,
        built,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Demo finished"
    );

    world.teardown();
    Ok(())
}
