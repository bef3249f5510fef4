//! End-to-end pipeline test: PLY source -> PointCloud -> RegularGrid ->
//! binary artifacts.

use glam::{UVec3, Vec3};

use lidarvox::cloud::{cache, PointCloud};
use lidarvox::grid::{RayonDispatch, RegularGrid, VOXEL_EMPTY};
use lidarvox::math::Aabb;

/// Two coincident pairs of labeled points in opposite corners of the unit
/// cube.
const SCAN: &str = "ply\n\
    format ascii 1.0\n\
    element vertex 4\n\
    property float x\n\
    property float y\n\
    property float z\n\
    property float scalar_Classification\n\
    end_header\n\
    0.1 0.1 0.1 1\n\
    0.1 0.1 0.1 1\n\
    0.9 0.9 0.9 2\n\
    0.9 0.9 0.9 2\n";

#[test]
fn voxelize_scan_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan.ply");
    std::fs::write(&source, SCAN).unwrap();

    // Ingest, writing the cache back.
    let mut cloud = PointCloud::new(&source, true);
    cloud.load().unwrap();
    assert_eq!(cloud.num_points(), 4);
    assert_eq!(cloud.max_label(), 2.0);

    // Voxelize over an explicit unit cube with 2 cells per axis.
    let mut grid = RegularGrid::new(Aabb::new(Vec3::ZERO, Vec3::ONE), UVec3::splat(2)).unwrap();
    grid.fill(&cloud, &RayonDispatch).unwrap();

    assert_eq!(grid.at(0, 0, 0), 1);
    assert_eq!(grid.at(1, 1, 1), 2);
    let occupied = grid.cells().iter().filter(|&&c| c != VOXEL_EMPTY).count();
    assert_eq!(occupied, 2);

    let mut boxes = Vec::new();
    grid.aabbs(&mut boxes);
    assert_eq!(boxes.len(), 2);
    for b in &boxes {
        assert_eq!(b.size(), grid.cell_size());
    }

    // Export: raw u16 per cell, no shape header.
    let exported = grid.export_binary(dir.path().join("scan")).unwrap();
    let bytes = std::fs::read(&exported).unwrap();
    assert_eq!(bytes.len(), grid.len() * 2);

    // The cache written during load must reproduce the cloud exactly, even
    // with the PLY source gone.
    assert!(cache::cache_path(&source).exists());
    std::fs::remove_file(&source).unwrap();

    let mut reloaded = PointCloud::new(&source, true);
    reloaded.load().unwrap();
    assert_eq!(reloaded.points(), cloud.points());
    assert_eq!(reloaded.aabb(), cloud.aabb());
    assert_eq!(reloaded.max_label(), cloud.max_label());

    // A grid filled from the cached cloud matches the original.
    let mut regrid = RegularGrid::new(Aabb::new(Vec3::ZERO, Vec3::ONE), UVec3::splat(2)).unwrap();
    regrid.fill(&reloaded, &RayonDispatch).unwrap();
    assert_eq!(regrid.cells(), grid.cells());
}

#[test]
fn export_cloud_and_reingest() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan.ply");
    std::fs::write(&source, SCAN).unwrap();

    let mut cloud = PointCloud::new(&source, false);
    cloud.load().unwrap();

    // Background export; the handle makes completion observable.
    let out = dir.path().join("export.ply");
    cloud.write(&out, true).join().unwrap().unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.contains("element vertex 4"));
    assert!(contents.contains("property uchar class"));
}
