//! Five ways of summing an array on the device.

use crate::buffers::{BufferSet, Slot};
use crate::device::{Device, KernelArg};
use crate::engine::Engine;
use crate::error::Result;
use crate::variant::ReductionVariant;
use crate::work_size::{
    halve_if_saturated, next_addressing_global, pad, shrink_local, WorkSize,
};
use kernel_abi::step::mult_step;
use kernel_abi::{Kernel, ELEMENTS_PER_WORK_ITEM};
use tracing::debug;

/// Drives the reduction passes. Every variant leaves the sum at index 0 of
/// the buffer currently in the ping role.
#[derive(Debug, Clone, Copy)]
pub struct ReductionEngine {
    local_work_size: usize,
}

impl ReductionEngine {
    /// Every kernel the engine launches.
    pub const KERNELS: [Kernel; 5] = [
        Kernel::InterleavedAddressing,
        Kernel::SequentialAddressing,
        Kernel::TreeDecomposition,
        Kernel::TreeDecompositionUnroll,
        Kernel::TreeDecompositionAtomics,
    ];

    pub fn new(local_work_size: usize) -> Self {
        Self { local_work_size }
    }

    /// Runs `variant` over the ping buffer and reads back the sum.
    pub fn reduce<D: Device>(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: ReductionVariant,
    ) -> Result<u32> {
        <Self as Engine<D>>::run(self, device, buffers, variant)?;
        <Self as Engine<D>>::read_result(self, device, buffers, variant)
    }

    /// In-place passes with a doubling stride.
    ///
    /// The two addressing variants differ only in whether the local size is
    /// halved after or before the global size is recomputed, which changes
    /// which work items are active at small strides.
    fn addressing<D: Device>(
        &self,
        device: &mut D,
        buffers: &BufferSet<D::Buffer>,
        variant: ReductionVariant,
    ) -> Result<()> {
        let n = buffers.len();
        let kernel = variant.kernel();
        let mut local = self.local_work_size;
        let mut global = pad(n / 2, local);

        for stride in mult_step(1, 2).take_while(|&s| s < n) {
            debug!(kernel = kernel.entry_point(), stride, global, local, "pass");
            device.launch(
                kernel,
                WorkSize::new(global, local),
                &[
                    KernelArg::Buffer(buffers.ping()),
                    KernelArg::Scalar(stride as u32),
                ],
            )?;

            let next_stride = stride * 2;
            if variant == ReductionVariant::InterleavedAddressing {
                global = next_addressing_global(global, n, next_stride, local);
                local = halve_if_saturated(local, global);
            } else {
                local = halve_if_saturated(local, global);
                global = next_addressing_global(global, n, next_stride, local);
            }
        }
        Ok(())
    }

    /// Every group folds `2 * local` elements of ping into one partial in
    /// pong, then the roles swap. Repeats until a single group remains.
    fn decomposition<D: Device>(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        kernel: Kernel,
    ) -> Result<()> {
        let mut count = buffers.len();
        let mut local = self.local_work_size;

        loop {
            let work = WorkSize::covering(count.div_ceil(ELEMENTS_PER_WORK_ITEM), local);
            debug!(
                kernel = kernel.entry_point(),
                count,
                global = work.global,
                local,
                "pass"
            );
            device.launch(
                kernel,
                work,
                &[
                    KernelArg::Buffer(buffers.ping()),
                    KernelArg::Buffer(buffers.pong()),
                    KernelArg::Scalar(count as u32),
                    KernelArg::Local(local),
                ],
            )?;
            buffers.swap();

            let groups = work.groups();
            if groups <= 1 {
                break;
            }
            count = groups;
            local = shrink_local(local, count.div_ceil(ELEMENTS_PER_WORK_ITEM));
        }
        Ok(())
    }
}

impl<D: Device> Engine<D> for ReductionEngine {
    type Variant = ReductionVariant;
    type Output = u32;

    fn run(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: ReductionVariant,
    ) -> Result<()> {
        match variant {
            ReductionVariant::InterleavedAddressing | ReductionVariant::SequentialAddressing => {
                self.addressing(device, buffers, variant)
            }
            ReductionVariant::Decomposition
            | ReductionVariant::DecompositionUnroll
            | ReductionVariant::DecompositionAtomics => {
                self.decomposition(device, buffers, variant.kernel())
            }
        }
    }

    fn read_result(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        _variant: ReductionVariant,
    ) -> Result<u32> {
        Ok(buffers.read_back(device, Slot::Ping, 1)?[0])
    }
}
