#![cfg_attr(not(test), no_std)]

//! Kernel identities shared by the host orchestration code and the device
//! programs that implement them.

mod kernels;
pub mod step;

pub use kernels::{ArgKind, Kernel};

/// Every work item of a tree or block-scan kernel consumes this many input
/// elements, so a work-group of `local` items covers `2 * local` elements.
pub const ELEMENTS_PER_WORK_ITEM: usize = 2;

/// The work-efficient scan asks for this many scratch elements per work item
/// so the device can pad its local scan against bank conflicts.
pub const SCAN_SCRATCH_FACTOR: usize = 4;

/// The largest work-group a launch may request.
pub const MAX_WORK_GROUP_SIZE: usize = 1024;
