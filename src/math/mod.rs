//! Math primitives

pub mod aabb;

pub use aabb::Aabb;
