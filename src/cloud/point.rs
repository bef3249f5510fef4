//! Labeled point record

use bytemuck::{Pod, Zeroable};

use crate::core::types::Vec3;

/// Single labeled point - exactly 16 bytes
///
/// The label is a semantic class id. Source data may carry it as a
/// fractional scalar; voxelization rounds it to the nearest integer id.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointRecord {
    /// World-space position
    pub position: [f32; 3],
    /// Semantic class id
    pub label: f32,
}

impl PointRecord {
    /// Create record from position and label
    pub fn new(position: Vec3, label: f32) -> Self {
        Self {
            position: position.to_array(),
            label,
        }
    }

    /// Get position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<PointRecord>(), 16);
    }

    #[test]
    fn test_accessors() {
        let p = PointRecord::new(Vec3::new(1.0, 2.0, 3.0), 7.0);
        assert_eq!(p.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(p.label, 7.0);
    }
}
