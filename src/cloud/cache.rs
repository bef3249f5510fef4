//! Binary point-cloud cache
//!
//! Fixed little-endian layout for fast reloads of a parsed cloud:
//!
//! ```text
//! [u64 point_count]
//! [point_count x PointRecord]   // 16 bytes each: position (3 x f32) + label (f32)
//! [Aabb]                        // min + max, 6 x f32
//! [u32 max_label]
//! ```
//!
//! Validation is length-consistency only; the cache is trusted to have been
//! written by this process (same provenance as the source file).

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytemuck::Zeroable;

use crate::cloud::point::PointRecord;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::aabb::{self, Aabb};

/// Extension appended to the source path to locate its cache
pub const CACHE_EXTENSION: &str = ".cache";

const RECORD_SIZE: usize = std::mem::size_of::<PointRecord>();
const HEADER_SIZE: usize = std::mem::size_of::<u64>();
const FOOTER_SIZE: usize = aabb::ENCODED_SIZE + std::mem::size_of::<u32>();

/// Deserialized cache contents
pub struct CacheContents {
    pub points: Vec<PointRecord>,
    pub aabb: Aabb,
    pub max_label: f32,
}

/// Cache path for a source file: the full source name plus [`CACHE_EXTENSION`]
pub fn cache_path(source: &Path) -> PathBuf {
    let mut path = source.as_os_str().to_owned();
    path.push(CACHE_EXTENSION);
    PathBuf::from(path)
}

/// Write the cache file (synchronous, all-or-nothing per block)
pub fn write_cache(path: &Path, points: &[PointRecord], aabb: &Aabb, max_label: f32) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    w.write_all(&(points.len() as u64).to_le_bytes())?;
    w.write_all(bytemuck::cast_slice(points))?;
    w.write_all(&aabb.to_le_bytes())?;
    w.write_all(&(max_label as u32).to_le_bytes())?;
    w.flush()?;

    Ok(())
}

/// Read a cache file written by [`write_cache`]
///
/// Fails with [`Error::Cache`] when the file length is inconsistent with
/// its declared point count.
pub fn read_cache(path: &Path) -> Result<CacheContents> {
    let bytes = fs::read(path)?;

    if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(Error::Cache(format!(
            "cache {} truncated ({} bytes)",
            path.display(),
            bytes.len()
        )));
    }

    let mut count_bytes = [0u8; HEADER_SIZE];
    count_bytes.copy_from_slice(&bytes[..HEADER_SIZE]);
    let count = u64::from_le_bytes(count_bytes) as usize;

    let expected = HEADER_SIZE + count * RECORD_SIZE + FOOTER_SIZE;
    if bytes.len() != expected {
        return Err(Error::Cache(format!(
            "cache {} length mismatch: {} bytes for {} points (expected {})",
            path.display(),
            bytes.len(),
            count,
            expected
        )));
    }

    // Copy through a zeroed Vec so the source slice's alignment is irrelevant
    let mut points = vec![PointRecord::zeroed(); count];
    let point_bytes = &bytes[HEADER_SIZE..HEADER_SIZE + count * RECORD_SIZE];
    bytemuck::cast_slice_mut::<PointRecord, u8>(&mut points).copy_from_slice(point_bytes);

    let mut aabb_bytes = [0u8; aabb::ENCODED_SIZE];
    let aabb_start = HEADER_SIZE + count * RECORD_SIZE;
    aabb_bytes.copy_from_slice(&bytes[aabb_start..aabb_start + aabb::ENCODED_SIZE]);
    let aabb = Aabb::from_le_bytes(&aabb_bytes);

    let mut label_bytes = [0u8; 4];
    label_bytes.copy_from_slice(&bytes[expected - 4..]);
    let max_label = u32::from_le_bytes(label_bytes) as f32;

    Ok(CacheContents {
        points,
        aabb,
        max_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec3;

    fn sample_points() -> Vec<PointRecord> {
        vec![
            PointRecord::new(Vec3::new(0.1, 0.2, 0.3), 1.0),
            PointRecord::new(Vec3::new(-4.0, 5.0, 6.5), 12.0),
            PointRecord::new(Vec3::new(9.0, -8.0, 7.0), 3.0),
        ]
    }

    #[test]
    fn test_cache_path() {
        let path = cache_path(Path::new("/data/scan.ply"));
        assert_eq!(path, PathBuf::from("/data/scan.ply.cache"));
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.cache");

        let points = sample_points();
        let mut aabb = Aabb::empty();
        for p in &points {
            aabb.update(p.position());
        }

        write_cache(&path, &points, &aabb, 12.0).unwrap();
        let contents = read_cache(&path).unwrap();

        assert_eq!(contents.points, points);
        assert_eq!(contents.aabb, aabb);
        assert_eq!(contents.max_label, 12.0);
    }

    #[test]
    fn test_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.cache");

        let points = sample_points();
        write_cache(&path, &points, &Aabb::new(Vec3::ZERO, Vec3::ONE), 12.0).unwrap();

        let len = std::fs::metadata(&path).unwrap().len() as usize;
        assert_eq!(len, 8 + points.len() * 16 + 24 + 4);
    }

    #[test]
    fn test_truncated_cache_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.cache");

        let points = sample_points();
        write_cache(&path, &points, &Aabb::new(Vec3::ZERO, Vec3::ONE), 12.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(read_cache(&path), Err(Error::Cache(_))));
    }

    #[test]
    fn test_empty_cloud_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.cache");

        write_cache(&path, &[], &Aabb::empty(), 0.0).unwrap();
        let contents = read_cache(&path).unwrap();
        assert!(contents.points.is_empty());
        assert_eq!(contents.max_label, 0.0);
    }
}
