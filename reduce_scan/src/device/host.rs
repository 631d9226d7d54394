//! An in-process device that executes the kernel contracts on the host.
//!
//! Commands are queued exactly like on an accelerator and only run when the
//! queue is drained by `finish` or by a blocking `read`. The work-groups of
//! one launch write disjoint outputs and run on the rayon pool.

use super::{check_signature, Device, DeviceMemory, KernelArg};
use crate::error::{Error, Result};
use crate::work_size::WorkSize;
use kernel_abi::{Kernel, ELEMENTS_PER_WORK_ITEM, MAX_WORK_GROUP_SIZE};
use rayon::prelude::*;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

type Storage = Arc<Mutex<Vec<u32>>>;

/// Width of the lock-step sub-group the unrolled and atomic kernels finish on.
const SUB_GROUP_SIZE: usize = 32;

/// A buffer living in host memory.
///
/// Commands that are still queued keep their own reference to the storage,
/// so dropping the handle early is safe.
#[derive(Debug)]
pub struct HostBuffer {
    id: u64,
    len: usize,
    storage: Storage,
}

impl HostBuffer {
    /// Identity of the underlying allocation.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl DeviceMemory for HostBuffer {
    fn len(&self) -> usize {
        self.len
    }
}

/// What a launch looked like when it was enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub kernel: Kernel,
    pub work: WorkSize,
    /// Buffer ids in argument order.
    pub buffers: Vec<u64>,
    pub scalars: Vec<u32>,
    pub scratch: Option<usize>,
}

impl LaunchRecord {
    fn new(kernel: Kernel, work: WorkSize, args: &[KernelArg<'_, HostBuffer>]) -> Self {
        let mut record = Self {
            kernel,
            work,
            buffers: Vec::new(),
            scalars: Vec::new(),
            scratch: None,
        };
        for arg in args {
            match arg {
                KernelArg::Buffer(b) => record.buffers.push(b.id),
                KernelArg::Scalar(v) => record.scalars.push(*v),
                KernelArg::Local(len) => record.scratch = Some(*len),
            }
        }
        record
    }
}

enum Bound {
    Buffer(Storage),
    Scalar(u32),
    Local(usize),
}

enum Command {
    Write { dst: Storage, data: Vec<u32> },
    Launch { kernel: Kernel, work: WorkSize, args: Vec<Bound> },
}

pub struct HostDevice {
    next_id: u64,
    program: BTreeSet<Kernel>,
    loaded: BTreeSet<Kernel>,
    queue: VecDeque<Command>,
    launches: Option<Vec<LaunchRecord>>,
    max_work_group_size: usize,
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDevice {
    pub fn new() -> Self {
        Self::with_kernels(&Kernel::ALL)
    }

    /// A device whose program only contains the given kernels.
    pub fn with_kernels(kernels: &[Kernel]) -> Self {
        Self {
            next_id: 0,
            program: kernels.iter().copied().collect(),
            loaded: BTreeSet::new(),
            queue: VecDeque::new(),
            launches: None,
            max_work_group_size: MAX_WORK_GROUP_SIZE,
        }
    }

    pub fn with_max_work_group_size(mut self, max: usize) -> Self {
        self.max_work_group_size = max;
        self
    }

    /// Keeps a record of every launch from now on.
    pub fn recording(mut self) -> Self {
        self.launches.get_or_insert_with(Vec::new);
        self
    }

    /// Every launch enqueued while recording, oldest first.
    pub fn launches(&self) -> &[LaunchRecord] {
        self.launches.as_deref().unwrap_or(&[])
    }

    /// Number of commands waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn validate_launch(
        &self,
        kernel: Kernel,
        work: WorkSize,
        args: &[KernelArg<'_, HostBuffer>],
    ) -> Result<()> {
        if !self.loaded.contains(&kernel) {
            return Err(Error::launch(kernel, "kernel has not been loaded"));
        }
        check_signature(kernel, args)?;
        if work.local == 0 || work.global == 0 || work.global % work.local != 0 {
            return Err(Error::launch(
                kernel,
                format!(
                    "global size {} is not a positive multiple of local size {}",
                    work.global, work.local
                ),
            ));
        }
        if work.local > self.max_work_group_size {
            return Err(Error::launch(
                kernel,
                format!(
                    "local size {} exceeds the device limit {}",
                    work.local, self.max_work_group_size
                ),
            ));
        }

        let buffers: Vec<&HostBuffer> = args
            .iter()
            .filter_map(|arg| match arg {
                KernelArg::Buffer(b) => Some(*b),
                _ => None,
            })
            .collect();
        if let [first, second] = buffers[..] {
            if Arc::ptr_eq(&first.storage, &second.storage) {
                return Err(Error::launch(kernel, "input and output buffers alias"));
            }
        }

        let required_scratch = match kernel {
            Kernel::TreeDecomposition
            | Kernel::TreeDecompositionUnroll
            | Kernel::TreeDecompositionAtomics => Some(work.local),
            Kernel::ScanWorkEfficient => Some(ELEMENTS_PER_WORK_ITEM * work.local),
            Kernel::ScanWorkEfficientAdd => Some(1),
            _ => None,
        };
        for arg in args {
            if let (KernelArg::Local(len), Some(required)) = (arg, required_scratch) {
                if *len < required {
                    return Err(Error::launch(
                        kernel,
                        format!("local scratch of {} elements, need {}", len, required),
                    ));
                }
            }
        }

        match (kernel, args) {
            (
                Kernel::InterleavedAddressing | Kernel::SequentialAddressing,
                [_, KernelArg::Scalar(0)],
            )
            | (Kernel::ScanNaive, [_, _, _, KernelArg::Scalar(0)]) => {
                Err(Error::launch(kernel, "stride must be at least 1"))
            }
            (
                Kernel::TreeDecomposition
                | Kernel::TreeDecompositionUnroll
                | Kernel::TreeDecompositionAtomics
                | Kernel::ScanNaive,
                [KernelArg::Buffer(input), _, KernelArg::Scalar(count), ..],
            ) if *count as usize > input.len() => Err(Error::launch(
                kernel,
                format!("element count {} exceeds the input buffer", count),
            )),
            _ => Ok(()),
        }
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(command) = self.queue.pop_front() {
            match command {
                Command::Write { dst, data } => {
                    let mut dst = lock(&dst)?;
                    dst[..data.len()].copy_from_slice(&data);
                }
                Command::Launch { kernel, work, args } => execute(kernel, work, &args)?,
            }
        }
        Ok(())
    }
}

impl Device for HostDevice {
    type Buffer = HostBuffer;

    fn name(&self) -> &str {
        "host emulator"
    }

    fn alloc(&mut self, len: usize) -> Result<HostBuffer> {
        if len == 0 {
            return Err(Error::Allocation {
                len,
                reason: "zero-length buffer".into(),
            });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| Error::Allocation {
            len,
            reason: e.to_string(),
        })?;
        data.resize(len, 0);

        let id = self.next_id;
        self.next_id += 1;
        Ok(HostBuffer {
            id,
            len,
            storage: Arc::new(Mutex::new(data)),
        })
    }

    fn load_kernels(&mut self, kernels: &[Kernel]) -> Result<()> {
        for &kernel in kernels {
            if !self.program.contains(&kernel) {
                return Err(Error::KernelCreation {
                    kernel: kernel.entry_point(),
                    reason: "entry point not found in program".into(),
                });
            }
            self.loaded.insert(kernel);
        }
        Ok(())
    }

    fn write(&mut self, dst: &HostBuffer, src: &[u32]) -> Result<()> {
        if src.len() > dst.len {
            return Err(Error::Transfer(format!(
                "cannot write {} elements into a buffer of {}",
                src.len(),
                dst.len
            )));
        }
        self.queue.push_back(Command::Write {
            dst: Arc::clone(&dst.storage),
            data: src.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, src: &HostBuffer, dst: &mut [u32]) -> Result<()> {
        if dst.len() > src.len {
            return Err(Error::Transfer(format!(
                "cannot read {} elements from a buffer of {}",
                dst.len(),
                src.len
            )));
        }
        self.drain()?;
        let src = lock(&src.storage)?;
        dst.copy_from_slice(&src[..dst.len()]);
        Ok(())
    }

    fn launch(
        &mut self,
        kernel: Kernel,
        work: WorkSize,
        args: &[KernelArg<'_, HostBuffer>],
    ) -> Result<()> {
        self.validate_launch(kernel, work, args)?;

        let bound = args
            .iter()
            .map(|arg| match arg {
                KernelArg::Buffer(b) => Bound::Buffer(Arc::clone(&b.storage)),
                KernelArg::Scalar(v) => Bound::Scalar(*v),
                KernelArg::Local(len) => Bound::Local(*len),
            })
            .collect();
        trace!(?kernel, global = work.global, local = work.local, "enqueue");

        if let Some(launches) = self.launches.as_mut() {
            launches.push(LaunchRecord::new(kernel, work, args));
        }
        self.queue.push_back(Command::Launch {
            kernel,
            work,
            args: bound,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.drain()
    }
}

fn lock(storage: &Storage) -> Result<MutexGuard<'_, Vec<u32>>> {
    storage
        .lock()
        .map_err(|_| Error::Sync("buffer lock poisoned by a failed command".into()))
}

fn execute(kernel: Kernel, work: WorkSize, args: &[Bound]) -> Result<()> {
    match (kernel, args) {
        (Kernel::InterleavedAddressing, [Bound::Buffer(buf), Bound::Scalar(stride)]) => {
            interleaved_addressing(&mut lock(buf)?, *stride as usize, work.global);
        }
        (Kernel::SequentialAddressing, [Bound::Buffer(buf), Bound::Scalar(stride)]) => {
            sequential_addressing(&mut lock(buf)?, *stride as usize, work.global);
        }
        (
            Kernel::TreeDecomposition
            | Kernel::TreeDecompositionUnroll
            | Kernel::TreeDecompositionAtomics,
            [Bound::Buffer(input), Bound::Buffer(output), Bound::Scalar(count), Bound::Local(scratch)],
        ) => {
            let input = lock(input)?;
            let mut output = lock(output)?;
            let group = Group::new(work, *scratch);
            let partials = reduce_groups(kernel, &input[..*count as usize], group);
            output
                .iter_mut()
                .zip(partials)
                .for_each(|(out, partial)| *out = partial);
        }
        (
            Kernel::ScanNaive,
            [Bound::Buffer(input), Bound::Buffer(output), Bound::Scalar(count), Bound::Scalar(offset)],
        ) => {
            let input = lock(input)?;
            let mut output = lock(output)?;
            let limit = (*count as usize).min(work.global).min(output.len());
            scan_naive(&input, &mut output[..limit], *offset as usize);
        }
        (
            Kernel::ScanWorkEfficient,
            [Bound::Buffer(level), Bound::Buffer(next), Bound::Local(scratch)],
        ) => {
            let mut level = lock(level)?;
            let mut next = lock(next)?;
            let totals = scan_blocks(&mut level, Group::new(work, *scratch));
            next.iter_mut()
                .zip(totals)
                .for_each(|(slot, total)| *slot = total);
        }
        (
            Kernel::ScanWorkEfficientAdd,
            [Bound::Buffer(higher), Bound::Buffer(lower), Bound::Local(scratch)],
        ) => {
            let higher = lock(higher)?;
            let mut lower = lock(lower)?;
            add_block_prefixes(&higher, &mut lower, Group::new(work, *scratch));
        }
        _ => return Err(Error::launch(kernel, "arguments do not match the kernel")),
    }
    Ok(())
}

/// Shape of the work-groups of one launch.
#[derive(Debug, Clone, Copy)]
struct Group {
    count: usize,
    local: usize,
    scratch: usize,
}

impl Group {
    fn new(work: WorkSize, scratch: usize) -> Self {
        Self {
            count: work.groups(),
            local: work.local,
            scratch,
        }
    }

    /// Input elements consumed by one group.
    fn block(&self) -> usize {
        ELEMENTS_PER_WORK_ITEM * self.local
    }
}

fn interleaved_addressing(buf: &mut [u32], stride: usize, global: usize) {
    buf.par_chunks_mut(2 * stride)
        .take(global)
        .for_each(|pair| {
            if pair.len() > stride {
                pair[0] = pair[0].wrapping_add(pair[stride]);
            }
        });
}

/// The live partial sums form the prefix `ceil(len / stride)`; its upper half
/// is folded onto its lower half.
fn sequential_addressing(buf: &mut [u32], stride: usize, global: usize) {
    let live = buf.len().div_ceil(stride);
    let half = live.div_ceil(2);
    let active = (live - half).min(global);
    let (lower, upper) = buf.split_at_mut(half);
    lower[..active]
        .par_iter_mut()
        .zip(upper[..active].par_iter())
        .for_each(|(a, b)| *a = a.wrapping_add(*b));
}

fn reduce_groups(kernel: Kernel, input: &[u32], group: Group) -> Vec<u32> {
    let block = group.block();
    (0..group.count)
        .into_par_iter()
        .map(|g| {
            let start = (g * block).min(input.len());
            let end = (start + block).min(input.len());

            // Every work item adds its two elements on the way into scratch.
            let mut scratch = vec![0u32; group.scratch];
            for (t, slot) in scratch[..group.local].iter_mut().enumerate() {
                let a = input.get(start + t).filter(|_| start + t < end);
                let b = input
                    .get(start + t + group.local)
                    .filter(|_| start + t + group.local < end);
                *slot = a.copied().unwrap_or(0).wrapping_add(b.copied().unwrap_or(0));
            }
            let lanes = &mut scratch[..group.local];

            match kernel {
                Kernel::TreeDecompositionUnroll => {
                    let width = tree_fold(lanes, SUB_GROUP_SIZE);
                    lanes[..width]
                        .iter()
                        .fold(0u32, |acc, x| acc.wrapping_add(*x))
                }
                Kernel::TreeDecompositionAtomics => {
                    let total = AtomicU32::new(0);
                    lanes.chunks(SUB_GROUP_SIZE).for_each(|sub_group| {
                        let partial = sub_group.iter().fold(0u32, |acc, x| acc.wrapping_add(*x));
                        total.fetch_add(partial, Ordering::Relaxed);
                    });
                    total.into_inner()
                }
                _ => {
                    tree_fold(lanes, 1);
                    lanes[0]
                }
            }
        })
        .collect()
}

/// Halves the active width until it is at most `stop`, folding the upper half
/// onto the lower half each step. Returns the remaining width.
fn tree_fold(lanes: &mut [u32], stop: usize) -> usize {
    let mut width = lanes.len();
    while width > stop.max(1) {
        let half = width.div_ceil(2);
        for t in 0..width - half {
            lanes[t] = lanes[t].wrapping_add(lanes[t + half]);
        }
        width = half;
    }
    width
}

fn scan_naive(input: &[u32], output: &mut [u32], offset: usize) {
    output.par_iter_mut().enumerate().for_each(|(i, y)| {
        *y = if i >= offset {
            input[i].wrapping_add(input[i - offset])
        } else {
            input[i]
        };
    });
}

/// Scans every block of the level in place and returns the block totals.
fn scan_blocks(level: &mut [u32], group: Group) -> Vec<u32> {
    let block = group.block();
    level
        .par_chunks_mut(block)
        .take(group.count)
        .map(|chunk| {
            let mut scratch = vec![0u32; group.scratch];
            scratch[..chunk.len()].copy_from_slice(chunk);
            let total = inclusive_sequential_scan(&mut scratch[..block]);
            chunk.copy_from_slice(&scratch[..chunk.len()]);
            total
        })
        .collect()
}

/// Adds the scanned total of every preceding block to the elements of a block.
fn add_block_prefixes(higher: &[u32], lower: &mut [u32], group: Group) {
    lower
        .par_chunks_mut(group.block())
        .take(group.count)
        .enumerate()
        .skip(1)
        .for_each(|(g, chunk)| {
            if let Some(&prefix) = higher.get(g - 1) {
                chunk.iter_mut().for_each(|x| *x = x.wrapping_add(prefix));
            }
        });
}

/// In-place inclusive sequential scan. Returns the total.
fn inclusive_sequential_scan(xs: &mut [u32]) -> u32 {
    let mut accumulator = 0u32;
    for x in xs.iter_mut() {
        accumulator = accumulator.wrapping_add(*x);
        *x = accumulator;
    }
    accumulator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> HostDevice {
        let mut device = HostDevice::new();
        device.load_kernels(&Kernel::ALL).unwrap();
        device
    }

    fn buffer_with(device: &mut HostDevice, data: &[u32]) -> HostBuffer {
        let buf = device.alloc(data.len()).unwrap();
        device.write(&buf, data).unwrap();
        buf
    }

    fn contents(device: &mut HostDevice, buf: &HostBuffer) -> Vec<u32> {
        let mut out = vec![0; buf.len()];
        device.read(buf, &mut out).unwrap();
        out
    }

    #[test]
    fn commands_wait_for_a_drain() {
        let mut device = device();
        let buf = buffer_with(&mut device, &[1, 2, 3, 4]);
        device
            .launch(
                Kernel::InterleavedAddressing,
                WorkSize::new(2, 2),
                &[KernelArg::Buffer(&buf), KernelArg::Scalar(1)],
            )
            .unwrap();
        assert_eq!(device.pending(), 2);

        device.finish().unwrap();
        assert_eq!(device.pending(), 0);
        assert_eq!(contents(&mut device, &buf), vec![3, 2, 7, 4]);
    }

    #[test]
    fn sequential_addressing_folds_the_live_prefix() {
        let mut device = device();
        let buf = buffer_with(&mut device, &[1, 2, 3, 4, 5]);
        // live = 5, half = 3: a[0] += a[3], a[1] += a[4]
        device
            .launch(
                Kernel::SequentialAddressing,
                WorkSize::new(4, 4),
                &[KernelArg::Buffer(&buf), KernelArg::Scalar(1)],
            )
            .unwrap();
        assert_eq!(contents(&mut device, &buf), vec![5, 7, 3, 4, 5]);
    }

    #[test]
    fn tree_kernels_emit_one_partial_per_group() {
        let mut device = device();
        let input = buffer_with(&mut device, &(1..=20).collect::<Vec<u32>>());
        for kernel in [
            Kernel::TreeDecomposition,
            Kernel::TreeDecompositionUnroll,
            Kernel::TreeDecompositionAtomics,
        ] {
            let output = device.alloc(20).unwrap();
            // Groups of 4 items cover 8 elements each.
            device
                .launch(
                    kernel,
                    WorkSize::new(12, 4),
                    &[
                        KernelArg::Buffer(&input),
                        KernelArg::Buffer(&output),
                        KernelArg::Scalar(20),
                        KernelArg::Local(4),
                    ],
                )
                .unwrap();
            let actual = contents(&mut device, &output);
            assert_eq!(&actual[..3], &[36, 100, 74], "{:?}", kernel);
        }
    }

    #[test]
    fn scan_kernels_follow_their_contracts() {
        let mut device = device();
        let input = buffer_with(&mut device, &[1; 6]);
        let output = device.alloc(6).unwrap();
        device
            .launch(
                Kernel::ScanNaive,
                WorkSize::new(8, 4),
                &[
                    KernelArg::Buffer(&input),
                    KernelArg::Buffer(&output),
                    KernelArg::Scalar(6),
                    KernelArg::Scalar(2),
                ],
            )
            .unwrap();
        assert_eq!(contents(&mut device, &output), vec![1, 1, 2, 2, 2, 2]);

        let level = buffer_with(&mut device, &[1; 10]);
        let next = device.alloc(4).unwrap();
        device
            .launch(
                Kernel::ScanWorkEfficient,
                WorkSize::new(6, 2),
                &[
                    KernelArg::Buffer(&level),
                    KernelArg::Buffer(&next),
                    KernelArg::Local(8),
                ],
            )
            .unwrap();
        assert_eq!(contents(&mut device, &level), vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2]);
        assert_eq!(contents(&mut device, &next), vec![4, 4, 2, 0]);

        let higher = buffer_with(&mut device, &[4, 8, 10, 10]);
        device
            .launch(
                Kernel::ScanWorkEfficientAdd,
                WorkSize::new(6, 2),
                &[
                    KernelArg::Buffer(&higher),
                    KernelArg::Buffer(&level),
                    KernelArg::Local(8),
                ],
            )
            .unwrap();
        let expected: Vec<u32> = (1..=10).collect();
        assert_eq!(contents(&mut device, &level), expected);
    }

    #[test]
    fn rejects_malformed_launches() {
        let mut device = HostDevice::new().recording();
        device.load_kernels(&Kernel::ALL).unwrap();
        let a = device.alloc(8).unwrap();
        let b = device.alloc(8).unwrap();

        let uneven = device.launch(
            Kernel::InterleavedAddressing,
            WorkSize { global: 6, local: 4 },
            &[KernelArg::Buffer(&a), KernelArg::Scalar(1)],
        );
        assert!(matches!(uneven, Err(Error::Launch { .. })));

        let wrong_args = device.launch(
            Kernel::ScanNaive,
            WorkSize::new(8, 4),
            &[KernelArg::Buffer(&a), KernelArg::Scalar(1)],
        );
        assert!(matches!(wrong_args, Err(Error::Launch { .. })));

        let aliased = device.launch(
            Kernel::TreeDecomposition,
            WorkSize::new(4, 4),
            &[
                KernelArg::Buffer(&a),
                KernelArg::Buffer(&a),
                KernelArg::Scalar(8),
                KernelArg::Local(4),
            ],
        );
        assert!(matches!(aliased, Err(Error::Launch { .. })));

        let small_scratch = device.launch(
            Kernel::TreeDecomposition,
            WorkSize::new(4, 4),
            &[
                KernelArg::Buffer(&a),
                KernelArg::Buffer(&b),
                KernelArg::Scalar(8),
                KernelArg::Local(2),
            ],
        );
        assert!(matches!(small_scratch, Err(Error::Launch { .. })));
        assert!(device.launches().is_empty());
    }

    #[test]
    fn records_launches_only_when_asked() {
        let launch_twice = |device: &mut HostDevice| {
            device.load_kernels(&Kernel::ALL).unwrap();
            let buf = buffer_with(device, &[1; 8]);
            for stride in [1, 2] {
                device
                    .launch(
                        Kernel::InterleavedAddressing,
                        WorkSize::new(4, 4),
                        &[KernelArg::Buffer(&buf), KernelArg::Scalar(stride)],
                    )
                    .unwrap();
            }
            device.finish().unwrap();
        };

        let mut quiet = HostDevice::new();
        launch_twice(&mut quiet);
        assert!(quiet.launches().is_empty());

        let mut recording = HostDevice::new().recording();
        launch_twice(&mut recording);
        let actual = recording
            .launches()
            .iter()
            .map(|l| (l.kernel, l.scalars.clone()))
            .collect::<Vec<_>>();
        let expected = vec![
            (Kernel::InterleavedAddressing, vec![1]),
            (Kernel::InterleavedAddressing, vec![2]),
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn respects_the_work_group_limit() {
        let mut device = HostDevice::new().with_max_work_group_size(64);
        device.load_kernels(&Kernel::ALL).unwrap();
        let a = device.alloc(256).unwrap();
        let result = device.launch(
            Kernel::InterleavedAddressing,
            WorkSize::new(128, 128),
            &[KernelArg::Buffer(&a), KernelArg::Scalar(1)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_kernels_fail_to_load() {
        let mut device = HostDevice::with_kernels(&[Kernel::ScanNaive]);
        let result = device.load_kernels(&[Kernel::ScanNaive, Kernel::ScanWorkEfficient]);
        assert!(matches!(result, Err(Error::KernelCreation { .. })));
        assert!(result.unwrap_err().is_setup());
    }

    #[test]
    fn unloaded_kernels_cannot_launch() {
        let mut device = HostDevice::new();
        let a = device.alloc(4).unwrap();
        let result = device.launch(
            Kernel::InterleavedAddressing,
            WorkSize::new(2, 2),
            &[KernelArg::Buffer(&a), KernelArg::Scalar(1)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn transfers_are_bounds_checked() {
        let mut device = device();
        let a = device.alloc(2).unwrap();
        assert!(matches!(device.write(&a, &[1, 2, 3]), Err(Error::Transfer(_))));
        let mut out = [0u32; 3];
        assert!(matches!(device.read(&a, &mut out), Err(Error::Transfer(_))));
        assert!(matches!(device.alloc(0), Err(Error::Allocation { .. })));
    }
}
