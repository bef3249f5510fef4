//! Point-cloud voxelizer binary — loads a PLY scan, fills a labeled
//! regular grid over its bounding box, and exports the grid binary.
//!
//! Usage: cargo run --release --bin voxelize -- <CLOUD.ply> [OPTIONS]
//!
//! Options:
//!   --divs <N>      Grid subdivisions per axis (default: 128)
//!   --out <PATH>    Output stem for the grid binary (default: input path)
//!   --no-cache      Skip the binary point cache (read and write)
//!   --homogenize    Collapse labels to plain occupancy before export

use std::path::PathBuf;

use glam::UVec3;

use lidarvox::cloud::PointCloud;
use lidarvox::grid::{RayonDispatch, RegularGrid, VOXEL_EMPTY};

fn main() {
    lidarvox::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let input = match args.get(1).filter(|a| !a.starts_with("--")) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: voxelize <CLOUD.ply> [--divs N] [--out PATH] [--no-cache] [--homogenize]");
            std::process::exit(2);
        }
    };

    let divs = parse_u32_arg(&args, "--divs").unwrap_or(128);
    let out = parse_str_arg(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| input.clone());
    let use_cache = !has_flag(&args, "--no-cache");
    let homogenize = has_flag(&args, "--homogenize");

    let mut cloud = PointCloud::new(&input, use_cache);
    if let Err(err) = cloud.load() {
        log::error!("failed to load {}: {err}", input.display());
        std::process::exit(1);
    }

    log::info!(
        "{} points, max label {}, bounds {:?} .. {:?}",
        cloud.num_points(),
        cloud.max_label(),
        cloud.aabb().min,
        cloud.aabb().max
    );

    let mut grid = match RegularGrid::new(*cloud.aabb(), UVec3::splat(divs)) {
        Ok(grid) => grid,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = grid.fill(&cloud, &RayonDispatch) {
        log::error!("fill failed: {err}");
        std::process::exit(1);
    }

    let occupied = grid.cells().iter().filter(|&&c| c != VOXEL_EMPTY).count();
    log::info!(
        "grid {}^3: {} of {} cells occupied ({:.1}%)",
        divs,
        occupied,
        grid.len(),
        100.0 * occupied as f64 / grid.len() as f64
    );

    if homogenize {
        grid.homogenize();
    }

    match grid.export_binary(&out) {
        Ok(path) => log::info!("wrote {}", path.display()),
        Err(err) => {
            log::error!("export failed: {err}");
            std::process::exit(1);
        }
    }
}

fn parse_u32_arg(args: &[String], name: &str) -> Option<u32> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}
