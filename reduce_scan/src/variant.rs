use crate::buffers::Slot;
use kernel_abi::Kernel;
use std::fmt;

/// Something the harnesses can run, name and compare.
pub trait Variant: Copy + fmt::Debug + Eq + 'static {
    const ALL: &'static [Self];

    /// Name used in reports.
    fn name(self) -> &'static str;

    /// Buffer the variant reads its input from and leaves its result in.
    fn slot(self) -> Slot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionVariant {
    InterleavedAddressing,
    SequentialAddressing,
    Decomposition,
    DecompositionUnroll,
    DecompositionAtomics,
}

impl ReductionVariant {
    pub fn kernel(self) -> Kernel {
        match self {
            ReductionVariant::InterleavedAddressing => Kernel::InterleavedAddressing,
            ReductionVariant::SequentialAddressing => Kernel::SequentialAddressing,
            ReductionVariant::Decomposition => Kernel::TreeDecomposition,
            ReductionVariant::DecompositionUnroll => Kernel::TreeDecompositionUnroll,
            ReductionVariant::DecompositionAtomics => Kernel::TreeDecompositionAtomics,
        }
    }
}

impl Variant for ReductionVariant {
    const ALL: &'static [Self] = &[
        ReductionVariant::InterleavedAddressing,
        ReductionVariant::SequentialAddressing,
        ReductionVariant::Decomposition,
        ReductionVariant::DecompositionUnroll,
        ReductionVariant::DecompositionAtomics,
    ];

    fn name(self) -> &'static str {
        match self {
            ReductionVariant::InterleavedAddressing => "interleavedAddressing",
            ReductionVariant::SequentialAddressing => "sequentialAddressing",
            ReductionVariant::Decomposition => "kernelDecomposition",
            ReductionVariant::DecompositionUnroll => "kernelDecompositionUnroll",
            ReductionVariant::DecompositionAtomics => "kernelDecompositionAtomics",
        }
    }

    fn slot(self) -> Slot {
        Slot::Ping
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanVariant {
    Naive,
    WorkEfficient,
}

impl Variant for ScanVariant {
    const ALL: &'static [Self] = &[ScanVariant::Naive, ScanVariant::WorkEfficient];

    fn name(self) -> &'static str {
        match self {
            ScanVariant::Naive => "scanNaive",
            ScanVariant::WorkEfficient => "scanWorkEfficient",
        }
    }

    fn slot(self) -> Slot {
        match self {
            ScanVariant::Naive => Slot::Ping,
            ScanVariant::WorkEfficient => Slot::Level(0),
        }
    }
}
