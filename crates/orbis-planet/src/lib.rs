//! Planet generation: density sampling and surface extraction combined into a
//! world-space mesh plus spawn metadata.

mod error;
mod generator;
mod info;

pub use error::PlanetError;
pub use generator::{GeneratedPlanet, PlanetGenerator, generate_planet};
pub use info::PlanetInfo;

pub use orbis_mesh::{Mesh, MeshStats, MeshingOptions, Orientation, TriangulationMode};
pub use orbis_terrain::{GridAnchor, NoiseMapping, PlanetDescriptor};
