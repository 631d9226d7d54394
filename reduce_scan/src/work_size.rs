//! Work-partition arithmetic shared by every engine. Nothing here touches a
//! device.

use kernel_abi::step::div_step;
use kernel_abi::ELEMENTS_PER_WORK_ITEM;

/// The (global, local) launch shape of a one dimensional kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSize {
    pub global: usize,
    pub local: usize,
}

impl WorkSize {
    pub fn new(global: usize, local: usize) -> Self {
        debug_assert!(local >= 1 && global % local == 0);
        Self { global, local }
    }

    /// A launch of at least `items` work items in groups of `local`.
    pub fn covering(items: usize, local: usize) -> Self {
        Self::new(pad(items, local), local)
    }

    pub fn groups(&self) -> usize {
        self.global / self.local
    }
}

/// Rounds `items` up to the next multiple of `local`. The last work-group may
/// be partially idle; kernels bounds-check against their element count.
pub fn pad(items: usize, local: usize) -> usize {
    items.div_ceil(local) * local
}

/// Caps the local size at the work that remains so that late passes do not
/// launch groups that are mostly idle. Never grows the local size. The
/// result need not be a power of two, so tree kernels fold odd widths.
pub fn shrink_local(local: usize, remaining: usize) -> usize {
    if local > remaining {
        remaining.max(1)
    } else {
        local
    }
}

/// Halves the local size once the global size has collapsed onto it, which
/// avoids degenerate single-group passes.
pub fn halve_if_saturated(local: usize, global: usize) -> usize {
    if local != 1 && local == global {
        local / 2
    } else {
        local
    }
}

/// Number of work items that find a partner when `n` elements are folded at
/// `stride`: half of the `ceil(n / stride)` partial sums still alive.
pub fn active_pairs(n: usize, stride: usize) -> usize {
    n.div_ceil(stride) / 2
}

/// Global size of the pass after one at `global`: half of it, but never less
/// than the work the next stride needs.
pub fn next_addressing_global(global: usize, n: usize, next_stride: usize, local: usize) -> usize {
    pad((global / 2).max(active_pairs(n, next_stride)), local)
}

/// Number of level buffers the work-efficient scan needs for `n` elements
/// when every group scans `2 * min_group_size` elements.
pub fn level_count(n: usize, min_group_size: usize) -> usize {
    div_step(n, ELEMENTS_PER_WORK_ITEM * min_group_size).count() + 1
}

/// Element count of every level buffer, level 0 first.
///
/// Each level holds one block total per `2 * min_group_size` block of the
/// level below, at least `min_group_size` entries, and never more entries
/// than the level below.
pub fn level_sizes(n: usize, min_group_size: usize) -> Vec<usize> {
    let block = ELEMENTS_PER_WORK_ITEM * min_group_size;
    let mut sizes = Vec::with_capacity(level_count(n, min_group_size));
    let mut len = n;
    for _ in 0..level_count(n, min_group_size) {
        sizes.push(len);
        len = len.div_ceil(block).max(min_group_size).min(len);
    }
    sizes
}
