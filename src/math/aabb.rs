//! Axis-aligned bounding box

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners
///
/// Tracks the minimal box enclosing an evolving point set: start from
/// [`Aabb::empty`] and call [`Aabb::update`] per point. `min <= max` holds
/// componentwise once at least one point has been observed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Size in bytes of the fixed binary encoding (6 x f32)
pub const ENCODED_SIZE: usize = 24;

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted seed box: any `update` call sets both corners
    pub fn empty() -> Self {
        Self {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    /// Extend the box to include a point (monotone in both corners)
    pub fn update(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get half-extents
    pub fn extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Fixed little-endian encoding: min then max, 3 x f32 each
    pub fn to_le_bytes(&self) -> [u8; ENCODED_SIZE] {
        let mut bytes = [0u8; ENCODED_SIZE];
        for (i, v) in self
            .min
            .to_array()
            .iter()
            .chain(self.max.to_array().iter())
            .enumerate()
        {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    /// Decode the fixed little-endian encoding written by [`Aabb::to_le_bytes`]
    pub fn from_le_bytes(bytes: &[u8; ENCODED_SIZE]) -> Self {
        let mut vals = [0.0f32; 6];
        for (i, v) in vals.iter_mut().enumerate() {
            let mut quad = [0u8; 4];
            quad.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            *v = f32::from_le_bytes(quad);
        }
        Self {
            min: Vec3::new(vals[0], vals[1], vals[2]),
            max: Vec3::new(vals[3], vals[4], vals[5]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
        assert_eq!(aabb.extent(), Vec3::splat(0.5));
    }

    #[test]
    fn test_empty_seed_update() {
        let mut aabb = Aabb::empty();
        aabb.update(Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(aabb.min, Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_update_monotone() {
        let mut aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        aabb.update(Vec3::splat(0.5));
        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::ONE);

        aabb.update(Vec3::new(-1.0, 2.0, 0.5));
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_contains_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains_point(Vec3::splat(0.5)));
        assert!(!aabb.contains_point(Vec3::splat(2.0)));
    }

    #[test]
    fn test_byte_roundtrip() {
        let aabb = Aabb::new(Vec3::new(-1.5, 0.0, 2.25), Vec3::new(3.0, 4.5, 6.0));
        let bytes = aabb.to_le_bytes();
        assert_eq!(Aabb::from_le_bytes(&bytes), aabb);
    }
}
