//! Terrain error types.

use std::collections::TryReserveError;

/// A planet descriptor that violates its invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DescriptorError {
    /// The grid needs at least two samples per axis to contain one cube.
    #[error("resolution must be at least 2, got {0}")]
    ResolutionTooSmall(usize),

    /// The sampled volume must have a positive, finite extent.
    #[error("world size must be positive and finite, got {0}")]
    InvalidWorldSize(f32),

    /// The base radius must be non-negative and finite.
    #[error("radius must be non-negative and finite, got {0}")]
    InvalidRadius(f32),

    /// A noise, height or placement parameter is NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),
}

/// Errors that abort density sampling.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The descriptor failed validation.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// `resolution³` does not fit in `usize`.
    #[error("density grid of resolution {0} is too large to address")]
    GridTooLarge(usize),

    /// The grid buffer could not be allocated.
    #[error("failed to allocate density grid of {samples} samples: {source}")]
    Allocation {
        samples: usize,
        #[source]
        source: TryReserveError,
    },

    /// A raw value buffer does not match the requested grid dimensions.
    #[error("density buffer holds {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A sampling worker thread could not be started.
    #[error("failed to spawn density worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A sampling worker thread panicked.
    #[error("density worker panicked")]
    WorkerPanicked,
}
