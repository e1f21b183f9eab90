//! Meshing error types.

use std::collections::TryReserveError;

/// Errors that abort surface extraction.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// A mesh buffer could not grow.
    #[error("failed to allocate mesh buffers: {0}")]
    Allocation(#[source] TryReserveError),

    /// The mesh has more vertices than a `u32` index can address.
    #[error("mesh needs {0} vertices, more than 32-bit indices can address")]
    IndexOverflow(usize),

    /// A meshing worker thread could not be started.
    #[error("failed to spawn meshing worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A meshing worker thread panicked.
    #[error("meshing worker panicked")]
    WorkerPanicked,
}
