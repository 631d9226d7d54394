//! Inclusive prefix sums on the device.

use crate::buffers::BufferSet;
use crate::device::{Device, DeviceMemory, KernelArg};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::variant::{ScanVariant, Variant};
use crate::work_size::WorkSize;
use kernel_abi::step::mult_step;
use kernel_abi::{Kernel, ELEMENTS_PER_WORK_ITEM, SCAN_SCRATCH_FACTOR};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ScanEngine {
    local_work_size: usize,
}

impl ScanEngine {
    /// Every kernel the engine launches.
    pub const KERNELS: [Kernel; 3] = [
        Kernel::ScanNaive,
        Kernel::ScanWorkEfficient,
        Kernel::ScanWorkEfficientAdd,
    ];

    /// `local_work_size` applies to the naive scan. The work-efficient scan
    /// always runs with the group size its level sequence was laid out for.
    pub fn new(local_work_size: usize) -> Self {
        Self { local_work_size }
    }

    /// Runs `variant` and reads back all `N` prefix sums.
    pub fn scan<D: Device>(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: ScanVariant,
    ) -> Result<Vec<u32>> {
        <Self as Engine<D>>::run(self, device, buffers, variant)?;
        <Self as Engine<D>>::read_result(self, device, buffers, variant)
    }

    /// Hillis-Steele: one pass per doubling offset, ping to pong.
    fn naive<D: Device>(&self, device: &mut D, buffers: &mut BufferSet<D::Buffer>) -> Result<()> {
        let n = buffers.len();
        let work = WorkSize::covering(n, self.local_work_size);

        for offset in mult_step(1, 2).take_while(|&o| o < n) {
            debug!(offset, global = work.global, local = work.local, "naive pass");
            device.launch(
                Kernel::ScanNaive,
                work,
                &[
                    KernelArg::Buffer(buffers.ping()),
                    KernelArg::Buffer(buffers.pong()),
                    KernelArg::Scalar(n as u32),
                    KernelArg::Scalar(offset as u32),
                ],
            )?;
            buffers.swap();
        }
        Ok(())
    }

    /// Blelloch-style scan over the level sequence.
    ///
    /// The up-sweep scans every `2 * m` block of a level in place and writes
    /// the block totals into the next level. The down-sweep then walks back
    /// down, adding the scanned total of all preceding blocks into every
    /// block of the level below. Level 0 ends up fully scanned.
    fn work_efficient<D: Device>(
        &self,
        device: &mut D,
        buffers: &BufferSet<D::Buffer>,
    ) -> Result<()> {
        let m = buffers.min_group_size().ok_or_else(|| {
            Error::InvalidConfig("the work-efficient scan needs a level sequence".into())
        })?;
        let scratch = SCAN_SCRATCH_FACTOR * m;
        let levels = buffers.level_count();

        for i in 0..levels.saturating_sub(1) {
            let len = buffers.level(i).len();
            let work = WorkSize::covering(len.div_ceil(ELEMENTS_PER_WORK_ITEM), m);
            debug!(level = i, len, global = work.global, local = m, "up-sweep");
            device.launch(
                Kernel::ScanWorkEfficient,
                work,
                &[
                    KernelArg::Buffer(buffers.level(i)),
                    KernelArg::Buffer(buffers.level(i + 1)),
                    KernelArg::Local(scratch),
                ],
            )?;
        }

        for i in (2..levels).rev() {
            let len = buffers.level(i - 2).len();
            let work = WorkSize::covering(len.div_ceil(ELEMENTS_PER_WORK_ITEM), m);
            debug!(level = i - 2, len, global = work.global, local = m, "down-sweep");
            device.launch(
                Kernel::ScanWorkEfficientAdd,
                work,
                &[
                    KernelArg::Buffer(buffers.level(i - 1)),
                    KernelArg::Buffer(buffers.level(i - 2)),
                    KernelArg::Local(scratch),
                ],
            )?;
        }
        Ok(())
    }
}

impl<D: Device> Engine<D> for ScanEngine {
    type Variant = ScanVariant;
    type Output = Vec<u32>;

    fn run(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: ScanVariant,
    ) -> Result<()> {
        match variant {
            ScanVariant::Naive => self.naive(device, buffers),
            ScanVariant::WorkEfficient => self.work_efficient(device, buffers),
        }
    }

    fn read_result(
        &self,
        device: &mut D,
        buffers: &mut BufferSet<D::Buffer>,
        variant: ScanVariant,
    ) -> Result<Vec<u32>> {
        let n = buffers.len();
        Ok(buffers.read_back(device, variant.slot(), n)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::ScanEngine;
    use crate::buffers::{BufferSet, Slot};
    use crate::device::{Device, DeviceMemory, HostBuffer, HostDevice};
    use crate::error::Error;
    use crate::variant::{ScanVariant, Variant};
    use kernel_abi::Kernel;
    use proptest::prelude::*;

    fn setup(input: Vec<u32>, m: usize) -> (HostDevice, BufferSet<HostBuffer>) {
        let mut device = HostDevice::new().recording();
        device.load_kernels(&Kernel::ALL).unwrap();
        let buffers = BufferSet::for_scan(&mut device, input, m).unwrap();
        (device, buffers)
    }

    fn scan(input: Vec<u32>, local: usize, m: usize, variant: ScanVariant) -> Vec<u32> {
        let (mut device, mut buffers) = setup(input, m);
        buffers.upload(&mut device, variant.slot()).unwrap();
        ScanEngine::new(local)
            .scan(&mut device, &mut buffers, variant)
            .unwrap()
    }

    fn ramp(n: usize) -> Vec<u32> {
        (1..=n as u32).collect()
    }

    #[test]
    fn naive_scans_ones() {
        for n in [1, 2, 17, 1024, 3001] {
            let actual = scan(vec![1; n], 64, 256, ScanVariant::Naive);
            assert_eq!(actual, ramp(n), "n={}", n);
        }
    }

    #[test]
    fn work_efficient_scans_ones() {
        for n in [1, 3, 17, 1000, 1024, 3001] {
            for m in [1, 2, 4, 256] {
                let actual = scan(vec![1; n], 256, m, ScanVariant::WorkEfficient);
                assert_eq!(actual, ramp(n), "n={} m={}", n, m);
            }
        }
    }

    #[test]
    fn scans_distinct_values() {
        let input = (0..500u32).map(|i| i % 7).collect::<Vec<_>>();
        let expected = input
            .iter()
            .scan(0u32, |acc, x| {
                *acc += x;
                Some(*acc)
            })
            .collect::<Vec<_>>();
        assert_eq!(scan(input.clone(), 32, 4, ScanVariant::Naive), expected);
        assert_eq!(scan(input, 32, 4, ScanVariant::WorkEfficient), expected);
    }

    #[test]
    fn down_sweep_uses_the_add_kernel() {
        let (mut device, mut buffers) = setup(vec![1; 1000], 4);
        buffers.upload(&mut device, Slot::Level(0)).unwrap();
        ScanEngine::new(256)
            .scan(&mut device, &mut buffers, ScanVariant::WorkEfficient)
            .unwrap();

        let level_ids = buffers.levels().iter().map(|b| b.id()).collect::<Vec<_>>();
        let actual = device
            .launches()
            .iter()
            .map(|l| (l.kernel, l.buffers.clone(), l.work.global))
            .collect::<Vec<_>>();
        let up = Kernel::ScanWorkEfficient;
        let add = Kernel::ScanWorkEfficientAdd;
        let expected = vec![
            (up, vec![level_ids[0], level_ids[1]], 500),
            (up, vec![level_ids[1], level_ids[2]], 64),
            (up, vec![level_ids[2], level_ids[3]], 8),
            (up, vec![level_ids[3], level_ids[4]], 4),
            (add, vec![level_ids[3], level_ids[2]], 8),
            (add, vec![level_ids[2], level_ids[1]], 64),
            (add, vec![level_ids[1], level_ids[0]], 500),
        ];
        assert_eq!(actual, expected);
        assert!(device.launches().iter().all(|l| l.work.local == 4));
        assert!(device.launches().iter().all(|l| l.scratch == Some(16)));
    }

    #[test]
    fn naive_result_is_in_ping() {
        let (mut device, mut buffers) = setup(vec![1; 8], 4);
        buffers.upload(&mut device, Slot::Ping).unwrap();
        let first_ping = buffers.ping().id();
        ScanEngine::new(4)
            .scan(&mut device, &mut buffers, ScanVariant::Naive)
            .unwrap();

        // Three passes leave the roles swapped.
        assert_eq!(device.launches().len(), 3);
        assert_ne!(buffers.ping().id(), first_ping);
        let mut ping = vec![0; 8];
        device.read(buffers.ping(), &mut ping).unwrap();
        assert_eq!(ping, ramp(8));
    }

    #[test]
    fn work_efficient_needs_levels() {
        let mut device = HostDevice::new();
        device.load_kernels(&Kernel::ALL).unwrap();
        let mut buffers = BufferSet::for_reduction(&mut device, vec![1; 8]).unwrap();
        let actual = ScanEngine::new(4).scan(&mut device, &mut buffers, ScanVariant::WorkEfficient);
        assert!(matches!(actual, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn level_buffers_keep_their_lengths() {
        let (mut device, mut buffers) = setup(vec![1; 1000], 4);
        let before = buffers.levels().iter().map(|b| b.len()).collect::<Vec<_>>();
        buffers.upload(&mut device, Slot::Level(0)).unwrap();
        ScanEngine::new(4)
            .scan(&mut device, &mut buffers, ScanVariant::WorkEfficient)
            .unwrap();
        let after = buffers.levels().iter().map(|b| b.len()).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn scans_ones_to_a_ramp(n in 1usize..3000, m_exp in 0u32..9, local_exp in 0u32..9) {
            let m = 1usize << m_exp;
            let local = 1usize << local_exp;
            prop_assert_eq!(scan(vec![1; n], local, m, ScanVariant::Naive), ramp(n));
            prop_assert_eq!(scan(vec![1; n], local, m, ScanVariant::WorkEfficient), ramp(n));
        }
    }
}
