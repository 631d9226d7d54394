//! Correctness and timing drivers shared by both engines.

use crate::buffers::BufferSet;
use crate::device::Device;
use crate::engine::Engine;
use crate::error::Result;
use crate::variant::Variant;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Shortest per-iteration time a measurement reports, in milliseconds. Keeps
/// the throughput of very fast runs finite and positive.
const MIN_AVG_MS: f64 = 1e-6;

/// Wall time of `iterations` repetitions over `elements` inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub label: String,
    pub elements: usize,
    pub iterations: usize,
    pub elapsed: Duration,
}

impl Timing {
    pub fn new(label: impl Into<String>, elements: usize, iterations: usize, elapsed: Duration) -> Self {
        Self {
            label: label.into(),
            elements,
            iterations,
            elapsed,
        }
    }

    /// Average milliseconds per iteration.
    pub fn avg_ms(&self) -> f64 {
        let total_ms = self.elapsed.as_secs_f64() * 1e3;
        (total_ms / self.iterations.max(1) as f64).max(MIN_AVG_MS)
    }

    /// Billions of elements per second.
    pub fn throughput_gelems(&self) -> f64 {
        1e-6 * self.elements as f64 / self.avg_ms()
    }
}

/// Pass or fail for every variant that was checked, in run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport<V> {
    outcomes: Vec<(V, bool)>,
}

impl<V: Variant> ValidationReport<V> {
    pub fn outcomes(&self) -> &[(V, bool)] {
        &self.outcomes
    }

    /// True when at least one variant ran and none failed.
    pub fn all_passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|(_, passed)| *passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = V> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(variant, _)| *variant)
    }
}

/// Runs every variant once and compares its result with `reference`.
///
/// A mismatch is recorded and the remaining variants still run. Device
/// errors end the whole validation.
pub fn validate<D, E>(
    engine: &E,
    device: &mut D,
    buffers: &mut BufferSet<D::Buffer>,
    reference: &E::Output,
) -> Result<ValidationReport<E::Variant>>
where
    D: Device,
    E: Engine<D>,
{
    let mut outcomes = Vec::with_capacity(<E::Variant as Variant>::ALL.len());
    for &variant in <E::Variant as Variant>::ALL {
        buffers.upload(device, variant.slot())?;
        engine.run(device, buffers, variant)?;
        let actual = engine.read_result(device, buffers, variant)?;

        let passed = &actual == reference;
        if passed {
            info!(variant = variant.name(), "validation passed");
        } else {
            warn!(variant = variant.name(), "validation failed");
        }
        outcomes.push((variant, passed));
    }
    Ok(ValidationReport { outcomes })
}

/// Times `iterations` back to back runs of every variant between two queue
/// drains.
pub fn measure<D, E>(
    engine: &E,
    device: &mut D,
    buffers: &mut BufferSet<D::Buffer>,
    iterations: usize,
) -> Result<Vec<Timing>>
where
    D: Device,
    E: Engine<D>,
{
    let iterations = iterations.max(1);
    let mut timings = Vec::with_capacity(<E::Variant as Variant>::ALL.len());
    for &variant in <E::Variant as Variant>::ALL {
        buffers.upload(device, variant.slot())?;
        device.finish()?;

        let now = Instant::now();
        for _ in 0..iterations {
            engine.run(device, buffers, variant)?;
        }
        device.finish()?;
        let timing = Timing::new(variant.name(), buffers.len(), iterations, now.elapsed());

        info!(
            variant = variant.name(),
            avg_ms = timing.avg_ms(),
            gelems = timing.throughput_gelems(),
            "measured"
        );
        timings.push(timing);
    }
    Ok(timings)
}
