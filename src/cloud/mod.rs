//! Point-cloud ingestion: typed records, PLY interchange IO, binary cache

pub mod point;
pub mod ply;
pub mod cache;
pub mod point_cloud;

pub use point::PointRecord;
pub use point_cloud::PointCloud;
