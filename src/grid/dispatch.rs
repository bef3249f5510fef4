//! Data-parallel batch execution
//!
//! The voxelization passes are expressed against this capability instead of
//! a process-wide compute registry; callers inject whichever dispatcher
//! fits their embedding.

use rayon::prelude::*;

/// Executes one data-parallel pass over independent work items
///
/// A single `dispatch` call is one pass: the kernel runs once per item with
/// no ordering guarantee between items, and the call returns only after
/// every item has completed (full barrier). Pass sequencing is obtained by
/// making the calls in order. Kernels may share state only through
/// commutative operations (atomic increments) or exclusively-owned slots.
pub trait ComputeDispatch: Sync {
    fn dispatch(&self, items: usize, kernel: &(dyn Fn(usize) + Sync));
}

/// Rayon-backed dispatcher (the default substrate)
pub struct RayonDispatch;

impl ComputeDispatch for RayonDispatch {
    fn dispatch(&self, items: usize, kernel: &(dyn Fn(usize) + Sync)) {
        (0..items).into_par_iter().for_each(|i| kernel(i));
    }
}

/// Single-threaded dispatcher for tests and deterministic embedding
pub struct SerialDispatch;

impl ComputeDispatch for SerialDispatch {
    fn dispatch(&self, items: usize, kernel: &(dyn Fn(usize) + Sync)) {
        for i in 0..items {
            kernel(i);
        }
    }
}
