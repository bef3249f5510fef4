//! Regular voxel grid and its data-parallel fill pipeline

pub mod dispatch;
pub mod regular_grid;

pub use dispatch::{ComputeDispatch, RayonDispatch, SerialDispatch};
pub use regular_grid::{RegularGrid, GRID_EXTENSION, VOXEL_EMPTY, VOXEL_FREE};

use crate::core::types::Vec3;

/// Mesh carrier for cluster queries: vertex positions plus triangle indices
///
/// Classification is per-vertex; faces ride along for callers projecting
/// the resulting labels onto triangles.
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}
