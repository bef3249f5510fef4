//! Regular labeled voxel grid
//!
//! Partitions a bounding box into `nx * ny * nz` cells and fills each cell
//! with the majority point label via a three-pass parallel reduction:
//! reset a per-cell per-label vote histogram, scatter one vote per point,
//! then reduce every cell to its winning label. Scatter only increments,
//! so any interleaving of points yields the same histogram and the same
//! result.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::cloud::PointCloud;
use crate::core::error::Error;
use crate::core::types::{Result, UVec3, Vec3};
use crate::grid::dispatch::ComputeDispatch;
use crate::grid::Mesh;
use crate::math::Aabb;

/// Sentinel for a cell no point mapped into
pub const VOXEL_EMPTY: u16 = 0xFFFF;

/// Sentinel for an occupied cell whose label has been discarded
pub const VOXEL_FREE: u16 = 0xFFFE;

/// Extension appended to grid export paths
pub const GRID_EXTENSION: &str = ".grid";

/// Dense voxel grid over a world-space bounding box
///
/// Geometry (box, subdivisions, cell size) is fixed at build time; cells
/// hold either [`VOXEL_EMPTY`] or a label id. Rebuilding over a different
/// box means constructing a new grid.
pub struct RegularGrid {
    aabb: Aabb,
    num_divs: UVec3,
    cell_size: Vec3,
    cells: Vec<u16>,
}

impl RegularGrid {
    /// Build a grid over a bounding box with the given per-axis cell counts
    pub fn new(aabb: Aabb, subdivisions: UVec3) -> Result<Self> {
        let mut grid = Self::with_subdivisions(subdivisions)?;
        grid.build(aabb);
        Ok(grid)
    }

    /// Deferred-geometry constructor: subdivisions only, no cells yet
    ///
    /// The grid stays unbuilt (zero cells) until [`RegularGrid::build`]
    /// supplies the bounding box.
    pub fn with_subdivisions(subdivisions: UVec3) -> Result<Self> {
        if subdivisions.min_element() == 0 {
            return Err(Error::Grid(format!(
                "subdivisions must be at least 1 per axis, got {subdivisions}"
            )));
        }

        Ok(Self {
            aabb: Aabb::empty(),
            num_divs: subdivisions,
            cell_size: Vec3::ZERO,
            cells: Vec::new(),
        })
    }

    /// Set the grid geometry and allocate sentinel-filled cells
    pub fn build(&mut self, aabb: Aabb) {
        self.aabb = aabb;
        self.cell_size = aabb.size() / self.num_divs.as_vec3();
        self.cells = vec![VOXEL_EMPTY; self.len()];
    }

    /// Fill the grid from a point cloud by majority-label voting
    ///
    /// Three strictly-ordered passes through the dispatcher:
    /// 1. reset the `num_cells x num_labels` vote histogram;
    /// 2. scatter: per point, one atomic vote for (containing cell, label);
    /// 3. reduce: per cell, scan labels ascending and keep the first
    ///    maximum, so ties break toward the lowest label id. Cells with no
    ///    votes stay [`VOXEL_EMPTY`].
    pub fn fill(&mut self, cloud: &PointCloud, dispatch: &dyn ComputeDispatch) -> Result<()> {
        if self.cells.is_empty() {
            return Err(Error::Grid("fill called on an unbuilt grid".into()));
        }

        let num_cells = self.cells.len();
        let num_labels = cloud.max_label().floor() as usize + 1;
        let points = cloud.points();

        log::debug!(
            "filling {}x{}x{} grid from {} points, {} labels",
            self.num_divs.x,
            self.num_divs.y,
            self.num_divs.z,
            points.len(),
            num_labels
        );

        // Vote histogram keyed by (cell, label); the only concurrently
        // written buffer in the pipeline.
        let votes: Vec<AtomicU32> = std::iter::repeat_with(|| AtomicU32::new(0))
            .take(num_cells * num_labels)
            .collect();

        // Pass 1: reset
        dispatch.dispatch(votes.len(), &|i| {
            votes[i].store(0, Ordering::Relaxed);
        });

        // Pass 2: scatter votes (increments commute, order irrelevant)
        let grid = &*self;
        dispatch.dispatch(points.len(), &|i| {
            let record = &points[i];
            let cell = grid.position_index(record.position());
            let label = (record.label.round() as usize).min(num_labels - 1);
            let slot = grid.index(cell.x, cell.y, cell.z) * num_labels + label;
            votes[slot].fetch_add(1, Ordering::Relaxed);
        });

        // Pass 3: reduce each cell to its majority label; every output slot
        // is written by exactly one work item.
        let winners: Vec<AtomicU16> = self.cells.iter().map(|&c| AtomicU16::new(c)).collect();
        dispatch.dispatch(num_cells, &|cell| {
            let mut best = 0u32;
            let mut winner = VOXEL_EMPTY;
            for label in 0..num_labels {
                let count = votes[cell * num_labels + label].load(Ordering::Relaxed);
                if count > best {
                    best = count;
                    winner = label as u16;
                }
            }
            if best > 0 {
                winners[cell].store(winner, Ordering::Relaxed);
            }
        });

        self.cells = winners.into_iter().map(AtomicU16::into_inner).collect();
        Ok(())
    }

    /// Write a single cell directly, bypassing majority voting
    ///
    /// The cell containing `position` (clamped mapping) takes `value`;
    /// last write wins. Used for manual/incremental construction.
    pub fn insert_point(&mut self, position: Vec3, value: u16) {
        let cell = self.position_index(position);
        let idx = self.index(cell.x, cell.y, cell.z);
        self.cells[idx] = value;
    }

    /// Cell coordinates containing a world-space position
    ///
    /// `floor((p - min) / cell_size)` per axis, clamped into range: points
    /// on or beyond the box boundary absorb into the edge cells rather
    /// than being rejected.
    pub fn position_index(&self, position: Vec3) -> UVec3 {
        let rel = (position - self.aabb.min) / self.cell_size;
        UVec3::new(
            (rel.x as u32).min(self.num_divs.x - 1),
            (rel.y as u32).min(self.num_divs.y - 1),
            (rel.z as u32).min(self.num_divs.z - 1),
        )
    }

    /// Flat row-major index: x is the slowest-varying axis
    ///
    /// Coordinates must satisfy `0 <= c < num_divs` per axis; debug builds
    /// assert, release builds keep the unchecked contract.
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        debug_assert!(x < self.num_divs.x && y < self.num_divs.y && z < self.num_divs.z);
        (x * self.num_divs.y * self.num_divs.z + y * self.num_divs.z + z) as usize
    }

    /// Append one world-space box per occupied cell
    ///
    /// Boxes come out in ascending row-major (x, y, z) order, each exactly
    /// one cell in size.
    pub fn aabbs(&self, out: &mut Vec<Aabb>) {
        for x in 0..self.num_divs.x {
            for y in 0..self.num_divs.y {
                for z in 0..self.num_divs.z {
                    if self.cells[self.index(x, y, z)] != VOXEL_EMPTY {
                        let min =
                            self.aabb.min + self.cell_size * Vec3::new(x as f32, y as f32, z as f32);
                        out.push(Aabb::new(min, min + self.cell_size));
                    }
                }
            }
        }
    }

    /// Collapse every occupied cell to [`VOXEL_FREE`], discarding labels
    pub fn homogenize(&mut self) {
        for cell in &mut self.cells {
            if *cell != VOXEL_EMPTY {
                *cell = VOXEL_FREE;
            }
        }
    }

    /// Classify mesh vertices by the grid cell their position falls into
    ///
    /// Same clamped mapping as `fill`; returns one cell label per vertex.
    pub fn query_cluster(&self, mesh: &Mesh, dispatch: &dyn ComputeDispatch) -> Vec<u16> {
        let labels: Vec<AtomicU16> = (0..mesh.vertices.len())
            .map(|_| AtomicU16::new(VOXEL_EMPTY))
            .collect();

        dispatch.dispatch(mesh.vertices.len(), &|i| {
            let cell = self.position_index(mesh.vertices[i]);
            labels[i].store(
                self.cells[self.index(cell.x, cell.y, cell.z)],
                Ordering::Relaxed,
            );
        });

        labels.into_iter().map(AtomicU16::into_inner).collect()
    }

    /// Export the raw cell array to `path` + [`GRID_EXTENSION`]
    ///
    /// Little-endian u16 per cell, row-major, no shape header: the reader
    /// must know the subdivisions out of band. Returns the written path.
    pub fn export_binary(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let mut out_path = path.as_ref().as_os_str().to_owned();
        out_path.push(GRID_EXTENSION);
        let out_path = PathBuf::from(out_path);

        let file = File::create(&out_path)?;
        let mut w = BufWriter::new(file);
        for &cell in &self.cells {
            w.write_all(&cell.to_le_bytes())?;
        }
        w.flush()?;

        log::info!(
            "exported {} cells to {}",
            self.cells.len(),
            out_path.display()
        );
        Ok(out_path)
    }

    /// Cell value at grid coordinates
    pub fn at(&self, x: u32, y: u32, z: u32) -> u16 {
        self.cells[self.index(x, y, z)]
    }

    /// Overwrite the cell value at grid coordinates
    pub fn set(&mut self, x: u32, y: u32, z: u32, value: u16) {
        let idx = self.index(x, y, z);
        self.cells[idx] = value;
    }

    /// Whether the cell holds any value besides [`VOXEL_EMPTY`]
    pub fn is_occupied(&self, x: u32, y: u32, z: u32) -> bool {
        self.at(x, y, z) != VOXEL_EMPTY
    }

    /// Whether the cell is [`VOXEL_EMPTY`]
    pub fn is_empty(&self, x: u32, y: u32, z: u32) -> bool {
        self.at(x, y, z) == VOXEL_EMPTY
    }

    /// Total cell count (`nx * ny * nz`)
    pub fn len(&self) -> usize {
        (self.num_divs.x * self.num_divs.y * self.num_divs.z) as usize
    }

    /// Per-axis cell counts
    pub fn num_subdivisions(&self) -> UVec3 {
        self.num_divs
    }

    /// World-space size of one cell
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Grid bounding box
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Flat cell array, row-major (e.g. as a color-index buffer)
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }
}
