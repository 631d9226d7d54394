//! The narrow interface between the engines and whatever executes kernels.
//!
//! A device owns one in-order command queue. `write` and `launch` enqueue and
//! return immediately; `read` blocks until everything enqueued before it has
//! finished; `finish` drains the queue.

#[cfg(feature = "cuda")]
pub mod cuda;
pub mod host;

use crate::error::Result;
use crate::work_size::WorkSize;
use kernel_abi::{ArgKind, Kernel};

pub use host::{HostBuffer, HostDevice, LaunchRecord};

/// Device memory holding a fixed number of `u32` elements.
pub trait DeviceMemory {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One value bound to a kernel parameter.
pub enum KernelArg<'a, B> {
    Buffer(&'a B),
    Scalar(u32),
    /// Local scratch of the given number of `u32` elements.
    Local(usize),
}

impl<B> KernelArg<'_, B> {
    pub fn kind(&self) -> ArgKind {
        match self {
            KernelArg::Buffer(_) => ArgKind::Buffer,
            KernelArg::Scalar(_) => ArgKind::Scalar,
            KernelArg::Local(_) => ArgKind::LocalScratch,
        }
    }
}

pub trait Device {
    type Buffer: DeviceMemory;

    /// Human readable name used in reports.
    fn name(&self) -> &str;

    /// Allocates a zero-initialised buffer of `len` elements.
    fn alloc(&mut self, len: usize) -> Result<Self::Buffer>;

    /// Prepares the given kernels for launching.
    fn load_kernels(&mut self, kernels: &[Kernel]) -> Result<()>;

    /// Enqueues a copy of `src` into the front of `dst`.
    fn write(&mut self, dst: &Self::Buffer, src: &[u32]) -> Result<()>;

    /// Copies the first `dst.len()` elements of `src` once every command
    /// enqueued so far has completed.
    fn read(&mut self, src: &Self::Buffer, dst: &mut [u32]) -> Result<()>;

    fn launch(
        &mut self,
        kernel: Kernel,
        work: WorkSize,
        args: &[KernelArg<'_, Self::Buffer>],
    ) -> Result<()>;

    /// Blocks until the queue is empty.
    fn finish(&mut self) -> Result<()>;
}

/// Checks `args` against the kernel's declared parameters.
pub(crate) fn check_signature<B>(kernel: Kernel, args: &[KernelArg<'_, B>]) -> Result<()> {
    let expected = kernel.signature();
    let matches = expected.len() == args.len()
        && expected.iter().zip(args).all(|(kind, arg)| *kind == arg.kind());
    if matches {
        Ok(())
    } else {
        Err(crate::Error::launch(
            kernel,
            format!("expected arguments {:?}", expected),
        ))
    }
}
