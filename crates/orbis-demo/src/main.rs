//! Demo binary that generates one planet and reports the result.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orbis-demo -- --resolution 96 --seed 7` to try a different planet.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use orbis_config::{CliArgs, Config, default_config_dir};
use orbis_planet::{GeneratedPlanet, PlanetGenerator};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("orbis"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orbis_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        radius = config.planet.radius,
        resolution = config.planet.resolution,
        world_size = config.planet.world_size,
        seed = config.planet.seed,
        mode = ?config.meshing.mode,
        "Generating planet"
    );

    let planet = match PlanetGenerator::new(config.planet.clone())
        .with_meshing(config.meshing.clone())
        .with_workers(config.generation.worker_count())
        .generate()
    {
        Ok(planet) => planet,
        Err(e) => {
            error!("Planet generation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    report(&planet);
    ExitCode::SUCCESS
}

fn report(planet: &GeneratedPlanet) {
    let stats = &planet.stats;
    info!(
        cubes = stats.cubes,
        surface_cubes = stats.surface_cubes,
        triangles = stats.triangles,
        flipped = stats.flipped,
        short_edges = stats.short_edges,
        degenerate = stats.degenerate,
        "Mesh statistics"
    );

    if let Some((min, max)) = planet.mesh.bounds() {
        info!("Mesh bounds: min={min}, max={max}");
    } else {
        info!("Mesh is empty");
    }

    let vertex_bytes = bytemuck::cast_slice::<_, u8>(&planet.mesh.interleaved()).len();
    info!(
        vertex_bytes,
        index_bytes = planet.mesh.index_bytes().len(),
        "GPU buffer sizes"
    );

    let info = &planet.info;
    info!(
        "Planet: center={}, radius={}, world_size={}, spawn={}",
        info.center, info.radius, info.world_size, info.spawn_position
    );
    info!(
        "Spawn altitude {:.2}, up {}",
        info.altitude_of(info.spawn_position),
        info.up_at(info.spawn_position)
    );
}
