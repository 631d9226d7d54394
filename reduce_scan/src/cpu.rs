//! Sequential references the device results are checked against.

use crate::harness::Timing;
use std::time::Instant;

/// Wrapping sum of every element.
pub fn sequential_sum(xs: &[u32]) -> u32 {
    xs.iter().fold(0u32, |acc, x| acc.wrapping_add(*x))
}

/// Inclusive scan of the first `max_i` elements of `xs` into `ys`.
pub fn sequential_scan(xs: &[u32], ys: &mut [u32], max_i: usize) {
    let mut accumulator = 0u32;
    for (x, y) in xs.iter().zip(ys.iter_mut()).take(max_i) {
        accumulator = accumulator.wrapping_add(*x);
        *y = accumulator;
    }
}

/// Runs `f` `iterations` times and reports the average wall time.
pub fn time_reference<T>(
    label: &str,
    elements: usize,
    iterations: usize,
    mut f: impl FnMut() -> T,
) -> (T, Timing) {
    let iterations = iterations.max(1);
    let now = Instant::now();
    let mut result = f();
    for _ in 1..iterations {
        result = f();
    }
    let timing = Timing::new(label, elements, iterations, now.elapsed());
    (result, timing)
}
