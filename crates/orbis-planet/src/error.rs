//! Planet generation error types.

use orbis_mesh::MeshError;
use orbis_terrain::{DescriptorError, TerrainError};

/// Errors that abort planet generation.
#[derive(Debug, thiserror::Error)]
pub enum PlanetError {
    /// The planet descriptor failed validation.
    #[error("invalid planet descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Density sampling failed.
    #[error("density sampling failed: {0}")]
    Terrain(#[from] TerrainError),

    /// Surface extraction failed.
    #[error("surface extraction failed: {0}")]
    Mesh(#[from] MeshError),
}
