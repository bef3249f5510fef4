//! Core type aliases and re-exports

pub use glam::{Vec3, UVec3};

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;
