//! Lidarvox - LiDAR point-cloud voxelization
//!
//! Converts labeled 3D point clouds (PLY interchange format) into dense
//! labeled voxel grids via a multi-pass majority-vote fill, and persists
//! both the cloud and the grid in fixed-layout binary forms.

pub mod core;
pub mod math;
pub mod cloud;
pub mod grid;
