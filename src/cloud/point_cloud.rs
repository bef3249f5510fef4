//! Point-cloud loading and export

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::cloud::point::PointRecord;
use crate::cloud::{cache, ply};
use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::math::Aabb;

/// Labeled point cloud with a derived bounding box
///
/// Loading is one-shot: `load` ingests either the binary cache (when
/// enabled and present) or the PLY source, then refuses further calls.
pub struct PointCloud {
    source_path: PathBuf,
    use_cache: bool,
    points: Vec<PointRecord>,
    aabb: Aabb,
    max_label: f32,
    loaded: bool,
}

impl PointCloud {
    /// Create an unloaded cloud for a PLY source path
    ///
    /// `use_cache` enables the binary fast path: reads prefer an existing
    /// cache file, and a successful PLY parse writes one back.
    pub fn new(source_path: impl Into<PathBuf>, use_cache: bool) -> Self {
        Self {
            source_path: source_path.into(),
            use_cache,
            points: Vec::new(),
            aabb: Aabb::empty(),
            max_label: 0.0,
            loaded: false,
        }
    }

    /// Create an already-loaded cloud from in-memory points
    ///
    /// Bounding box and max label are derived from the records. Used for
    /// manual/incremental construction and tests; such a cloud has no
    /// source path and never touches the cache.
    pub fn from_points(points: Vec<PointRecord>) -> Self {
        let mut aabb = Aabb::empty();
        let mut max_label = 0.0f32;
        for p in &points {
            aabb.update(p.position());
            max_label = max_label.max(p.label);
        }

        Self {
            source_path: PathBuf::new(),
            use_cache: false,
            points,
            aabb,
            max_label,
            loaded: true,
        }
    }

    /// Load the cloud from disk (one-shot)
    ///
    /// Strategy: binary cache first when enabled and present, falling back
    /// to the PLY parse on any cache failure; a PLY failure is the overall
    /// failure and leaves the cloud empty. After a successful parse with no
    /// pre-existing cache, the cache is written back synchronously (a
    /// write-back failure is logged, not fatal).
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Err(Error::AlreadyLoaded);
        }

        let cache_path = cache::cache_path(&self.source_path);
        let cache_exists = self.use_cache && cache_path.exists();
        let mut from_cache = false;

        if cache_exists {
            match cache::read_cache(&cache_path) {
                Ok(contents) => {
                    self.points = contents.points;
                    self.aabb = contents.aabb;
                    self.max_label = contents.max_label;
                    from_cache = true;
                    log::info!(
                        "loaded {} points from cache {}",
                        self.points.len(),
                        cache_path.display()
                    );
                }
                Err(err) => {
                    log::warn!(
                        "cache read failed for {} ({err}), falling back to PLY",
                        cache_path.display()
                    );
                }
            }
        }

        if !from_cache {
            let points = ply::read_ply(&self.source_path)?;

            let mut aabb = Aabb::empty();
            let mut max_label = 0.0f32;
            for p in &points {
                aabb.update(p.position());
                max_label = max_label.max(p.label);
            }

            self.points = points;
            self.aabb = aabb;
            self.max_label = max_label;
            log::info!(
                "loaded {} points from {}",
                self.points.len(),
                self.source_path.display()
            );

            if self.use_cache && !cache_exists {
                if let Err(err) =
                    cache::write_cache(&cache_path, &self.points, &self.aabb, self.max_label)
                {
                    log::warn!("failed to write cache {}: {err}", cache_path.display());
                }
            }
        }

        self.loaded = true;
        Ok(())
    }

    /// Export the cloud to a PLY file on a background thread
    ///
    /// The returned handle makes completion and failure observable; joining
    /// it yields the writer's result. Dropping the handle without joining
    /// reverts to best-effort semantics.
    pub fn write(&self, path: impl Into<PathBuf>, ascii: bool) -> JoinHandle<Result<()>> {
        let path = path.into();
        let points = self.points.clone();

        thread::spawn(move || {
            if let Err(err) = ply::write_ply(&path, &points, ascii) {
                log::error!("point-cloud export to {} failed: {err}", path.display());
                return Err(err);
            }
            Ok(())
        })
    }

    /// Source path this cloud was created for
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Whether `load` has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Bounding box over all loaded points
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Number of loaded points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Maximum label value seen during ingestion
    pub fn max_label(&self) -> f32 {
        self.max_label
    }

    /// Loaded points, insertion-ordered; the index is the point's id
    pub fn points(&self) -> &[PointRecord] {
        &self.points
    }

    /// Positions only, for collaborators that take plain vertices
    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().map(|p| p.position()).collect()
    }
}
