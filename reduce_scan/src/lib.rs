//! Host-side orchestration of parallel reductions and prefix sums.
//!
//! The engines only decide what to launch: work sizes, buffer roles and
//! the order of passes. Kernels run behind the [`Device`] trait, either on
//! the in-process [`HostDevice`] or, with the `cuda` feature, on a CUDA
//! device.

pub mod buffers;
pub mod config;
pub mod cpu;
pub mod device;
mod engine;
mod error;
pub mod harness;
pub mod reduction;
pub mod report;
pub mod scan;
pub mod task;
pub mod variant;
pub mod work_size;

pub use buffers::{BufferSet, Slot};
pub use config::{InputPattern, RunConfig};
pub use device::{Device, DeviceMemory, HostBuffer, HostDevice, KernelArg};
pub use engine::Engine;
pub use error::{Error, Result};
pub use harness::{Timing, ValidationReport};
pub use reduction::ReductionEngine;
pub use scan::ScanEngine;
pub use task::{ComputeTask, ReductionTask, ScanTask, Summary};
pub use variant::{ReductionVariant, ScanVariant, Variant};
pub use work_size::WorkSize;
