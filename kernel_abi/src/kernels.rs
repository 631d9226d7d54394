/// The kind of value bound to one kernel parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// A global `u32` buffer.
    Buffer,
    /// A `u32` passed by value.
    Scalar,
    /// Work-group local scratch, sized in `u32` elements at launch time.
    LocalScratch,
}

use ArgKind::{Buffer, LocalScratch, Scalar};

/// Every device entry point the host drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kernel {
    InterleavedAddressing,
    SequentialAddressing,
    TreeDecomposition,
    TreeDecompositionUnroll,
    TreeDecompositionAtomics,
    ScanNaive,
    ScanWorkEfficient,
    ScanWorkEfficientAdd,
}

impl Kernel {
    pub const ALL: [Kernel; 8] = [
        Kernel::InterleavedAddressing,
        Kernel::SequentialAddressing,
        Kernel::TreeDecomposition,
        Kernel::TreeDecompositionUnroll,
        Kernel::TreeDecompositionAtomics,
        Kernel::ScanNaive,
        Kernel::ScanWorkEfficient,
        Kernel::ScanWorkEfficientAdd,
    ];

    /// Symbol name of the entry point in the compiled device module.
    pub const fn entry_point(self) -> &'static str {
        match self {
            Kernel::InterleavedAddressing => "reduction_interleaved_addressing",
            Kernel::SequentialAddressing => "reduction_sequential_addressing",
            Kernel::TreeDecomposition => "reduction_decomp",
            Kernel::TreeDecompositionUnroll => "reduction_decomp_unroll",
            Kernel::TreeDecompositionAtomics => "reduction_decomp_atomics",
            Kernel::ScanNaive => "scan_naive",
            Kernel::ScanWorkEfficient => "scan_work_efficient",
            Kernel::ScanWorkEfficientAdd => "scan_work_efficient_add",
        }
    }

    /// Parameters in binding order.
    pub const fn signature(self) -> &'static [ArgKind] {
        match self {
            // buffer, stride
            Kernel::InterleavedAddressing | Kernel::SequentialAddressing => &[Buffer, Scalar],
            // input, output, element count, scratch
            Kernel::TreeDecomposition
            | Kernel::TreeDecompositionUnroll
            | Kernel::TreeDecompositionAtomics => &[Buffer, Buffer, Scalar, LocalScratch],
            // input, output, element count, offset
            Kernel::ScanNaive => &[Buffer, Buffer, Scalar, Scalar],
            // level, next level, scratch
            Kernel::ScanWorkEfficient => &[Buffer, Buffer, LocalScratch],
            // higher level, lower level, scratch
            Kernel::ScanWorkEfficientAdd => &[Buffer, Buffer, LocalScratch],
        }
    }
}
