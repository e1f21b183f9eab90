//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use orbis_mesh::TriangulationMode;

use crate::Config;

/// Triangulation strategy as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TriangulationArg {
    Fan,
    Quad,
    FanAndQuad,
    MarchingCubes,
}

impl From<TriangulationArg> for TriangulationMode {
    fn from(arg: TriangulationArg) -> Self {
        match arg {
            TriangulationArg::Fan => TriangulationMode::Fan,
            TriangulationArg::Quad => TriangulationMode::Quad,
            TriangulationArg::FanAndQuad => TriangulationMode::FanAndQuad,
            TriangulationArg::MarchingCubes => TriangulationMode::MarchingCubes,
        }
    }
}

/// Orbis command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orbis", about = "Volumetric planet terrain generator")]
pub struct CliArgs {
    /// Planet base radius.
    #[arg(long)]
    pub radius: Option<f32>,

    /// Grid samples per axis (at least 2).
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Edge length of the sampled cube.
    #[arg(long)]
    pub world_size: Option<f32>,

    /// Noise frequency multiplier.
    #[arg(long)]
    pub noise_scale: Option<f32>,

    /// Number of noise octaves.
    #[arg(long)]
    pub octaves: Option<u32>,

    /// Terrain amplitude in world units.
    #[arg(long)]
    pub height_scale: Option<f32>,

    /// Noise seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Triangulation strategy.
    #[arg(long, value_enum)]
    pub triangulation: Option<TriangulationArg>,

    /// Worker threads (0 = one per logical CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.radius {
            self.planet.radius = radius;
        }
        if let Some(resolution) = args.resolution {
            self.planet.resolution = resolution;
        }
        if let Some(size) = args.world_size {
            self.planet.world_size = size;
        }
        if let Some(scale) = args.noise_scale {
            self.planet.noise_scale = scale;
        }
        if let Some(octaves) = args.octaves {
            self.planet.noise_octaves = octaves;
        }
        if let Some(height) = args.height_scale {
            self.planet.terrain_height_scale = height;
        }
        if let Some(seed) = args.seed {
            self.planet.seed = seed;
        }
        if let Some(mode) = args.triangulation {
            self.meshing.mode = mode.into();
        }
        if let Some(workers) = args.workers {
            self.generation.workers = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
