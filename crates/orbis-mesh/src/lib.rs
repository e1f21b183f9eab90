//! Surface extraction: cube classification, edge crossings, triangulation, and mesh data.

mod cube;
mod error;
mod extract;
mod mesh;
mod tables;
mod triangulate;

pub use cube::{
    CORNER_COUNT, CORNER_OFFSETS, Cube, EDGE_CORNERS, EDGE_COUNT, EdgeCrossings, MASK_INSIDE,
    MASK_OUTSIDE, interpolate_crossing,
};
pub use error::MeshError;
pub use extract::{ExtractedMesh, extract_mesh};
pub use mesh::{GpuVertex, Mesh};
pub use tables::{EDGE_TABLE, TRI_TABLE, triangle_edges};
pub use triangulate::{MeshStats, MeshingOptions, Orientation, TriangulationMode, Triangulator};
