//! The two benchmark tasks and the lifecycle they share.

use crate::buffers::BufferSet;
use crate::config::{self, InputPattern, RunConfig};
use crate::cpu::{sequential_scan, sequential_sum, time_reference};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::harness::{measure, validate, Timing, ValidationReport};
use crate::reduction::ReductionEngine;
use crate::scan::ScanEngine;
use crate::variant::{ReductionVariant, ScanVariant, Variant};
use tracing::{debug, info};

/// Init, compute, validate, release.
///
/// `compute_cpu` must run before `compute_gpu` so the device results have a
/// reference to be checked against.
pub trait ComputeTask<D: Device> {
    fn name(&self) -> &'static str;

    /// Compiles the kernels and allocates every device buffer.
    fn init_resources(&mut self, device: &mut D) -> Result<()>;

    /// Validates and then times every variant.
    fn compute_gpu(&mut self, device: &mut D, local_work_size: [usize; 3]) -> Result<()>;

    /// Computes and times the reference result.
    fn compute_cpu(&mut self);

    /// True when every variant matched the reference.
    fn validate_results(&self) -> bool;

    /// Frees the device buffers. Safe to call any number of times.
    fn release_resources(&mut self);

    fn summary(&self) -> Summary;
}

/// What a finished task reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub task: &'static str,
    pub size: usize,
    pub outcomes: Vec<(&'static str, bool)>,
    pub timings: Vec<Timing>,
    pub cpu: Option<Timing>,
}

fn summarize<V: Variant>(
    task: &'static str,
    size: usize,
    validation: Option<&ValidationReport<V>>,
    timings: &[Timing],
    cpu: Option<&Timing>,
) -> Summary {
    Summary {
        task,
        size,
        outcomes: validation
            .map(|report| {
                report
                    .outcomes()
                    .iter()
                    .map(|(v, passed)| (v.name(), *passed))
                    .collect()
            })
            .unwrap_or_default(),
        timings: timings.to_vec(),
        cpu: cpu.cloned(),
    }
}

pub struct ReductionTask<D: Device> {
    size: usize,
    input: InputPattern,
    perf_iterations: usize,
    cpu_iterations: usize,
    buffers: Option<BufferSet<D::Buffer>>,
    reference: Option<u32>,
    cpu_timing: Option<Timing>,
    validation: Option<ValidationReport<ReductionVariant>>,
    timings: Vec<Timing>,
}

impl<D: Device> ReductionTask<D> {
    pub fn new(size: usize) -> Self {
        Self::from_config(&RunConfig {
            size,
            ..RunConfig::reduction()
        })
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            size: config.size,
            input: config.input,
            perf_iterations: config.perf_iterations,
            cpu_iterations: config.cpu_iterations,
            buffers: None,
            reference: None,
            cpu_timing: None,
            validation: None,
            timings: Vec::new(),
        }
    }

    pub fn with_perf_iterations(mut self, iterations: usize) -> Self {
        self.perf_iterations = iterations;
        self
    }

    pub fn reference(&self) -> Option<u32> {
        self.reference
    }

    pub fn validation(&self) -> Option<&ValidationReport<ReductionVariant>> {
        self.validation.as_ref()
    }

    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }
}

impl<D: Device> ComputeTask<D> for ReductionTask<D> {
    fn name(&self) -> &'static str {
        "reduction"
    }

    fn init_resources(&mut self, device: &mut D) -> Result<()> {
        config::check_problem_size(self.size)?;
        device.load_kernels(&ReductionEngine::KERNELS)?;
        let buffers = BufferSet::for_reduction(device, self.input.generate(self.size))?;
        debug!(size = self.size, device = device.name(), "reduction resources ready");
        self.buffers = Some(buffers);
        Ok(())
    }

    fn compute_gpu(&mut self, device: &mut D, local_work_size: [usize; 3]) -> Result<()> {
        config::check_local_work_size(local_work_size)?;
        let buffers = self.buffers.as_mut().ok_or(Error::NotInitialized)?;
        let reference = self.reference.ok_or(Error::NotInitialized)?;
        let engine = ReductionEngine::new(local_work_size[0]);

        info!(size = self.size, local = local_work_size[0], "validating reduction");
        self.validation = Some(validate(&engine, device, buffers, &reference)?);
        self.timings = measure(&engine, device, buffers, self.perf_iterations)?;
        Ok(())
    }

    fn compute_cpu(&mut self) {
        let input = self.input.generate(self.size);
        let (sum, timing) =
            time_reference("cpu reference", self.size, self.cpu_iterations, || {
                sequential_sum(&input)
            });
        self.reference = Some(sum);
        self.cpu_timing = Some(timing);
    }

    fn validate_results(&self) -> bool {
        self.validation
            .as_ref()
            .map_or(false, ValidationReport::all_passed)
    }

    fn release_resources(&mut self) {
        if self.buffers.take().is_some() {
            debug!("released reduction resources");
        }
    }

    fn summary(&self) -> Summary {
        summarize(
            "reduction",
            self.size,
            self.validation.as_ref(),
            &self.timings,
            self.cpu_timing.as_ref(),
        )
    }
}

impl<D: Device> Drop for ReductionTask<D> {
    fn drop(&mut self) {
        ComputeTask::<D>::release_resources(self);
    }
}

pub struct ScanTask<D: Device> {
    size: usize,
    min_group_size: usize,
    input: InputPattern,
    perf_iterations: usize,
    cpu_iterations: usize,
    buffers: Option<BufferSet<D::Buffer>>,
    reference: Option<Vec<u32>>,
    cpu_timing: Option<Timing>,
    validation: Option<ValidationReport<ScanVariant>>,
    timings: Vec<Timing>,
}

impl<D: Device> ScanTask<D> {
    /// `min_group_size` defaults to 256.
    pub fn new(size: usize, min_group_size: Option<usize>) -> Self {
        let defaults = RunConfig::scan();
        Self::from_config(&RunConfig {
            size,
            min_group_size: min_group_size.unwrap_or(defaults.min_group_size),
            ..defaults
        })
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            size: config.size,
            min_group_size: config.min_group_size,
            input: config.input,
            perf_iterations: config.perf_iterations,
            cpu_iterations: config.cpu_iterations,
            buffers: None,
            reference: None,
            cpu_timing: None,
            validation: None,
            timings: Vec::new(),
        }
    }

    pub fn with_perf_iterations(mut self, iterations: usize) -> Self {
        self.perf_iterations = iterations;
        self
    }

    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }

    pub fn reference(&self) -> Option<&[u32]> {
        self.reference.as_deref()
    }

    pub fn validation(&self) -> Option<&ValidationReport<ScanVariant>> {
        self.validation.as_ref()
    }

    pub fn timings(&self) -> &[Timing] {
        &self.timings
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }
}

impl<D: Device> ComputeTask<D> for ScanTask<D> {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn init_resources(&mut self, device: &mut D) -> Result<()> {
        config::check_problem_size(self.size)?;
        config::check_group_size("minimum group size", self.min_group_size)?;
        device.load_kernels(&ScanEngine::KERNELS)?;
        let buffers = BufferSet::for_scan(
            device,
            self.input.generate(self.size),
            self.min_group_size,
        )?;
        debug!(
            size = self.size,
            levels = buffers.level_count(),
            device = device.name(),
            "scan resources ready"
        );
        self.buffers = Some(buffers);
        Ok(())
    }

    fn compute_gpu(&mut self, device: &mut D, local_work_size: [usize; 3]) -> Result<()> {
        config::check_local_work_size(local_work_size)?;
        let buffers = self.buffers.as_mut().ok_or(Error::NotInitialized)?;
        let reference = self.reference.as_ref().ok_or(Error::NotInitialized)?;
        let engine = ScanEngine::new(local_work_size[0]);

        info!(size = self.size, local = local_work_size[0], "validating scan");
        self.validation = Some(validate(&engine, device, buffers, reference)?);
        self.timings = measure(&engine, device, buffers, self.perf_iterations)?;
        Ok(())
    }

    fn compute_cpu(&mut self) {
        let input = self.input.generate(self.size);
        let mut output = vec![0; self.size];
        let ((), timing) = time_reference("cpu reference", self.size, self.cpu_iterations, || {
            sequential_scan(&input, &mut output, input.len())
        });
        self.reference = Some(output);
        self.cpu_timing = Some(timing);
    }

    fn validate_results(&self) -> bool {
        self.validation
            .as_ref()
            .map_or(false, ValidationReport::all_passed)
    }

    fn release_resources(&mut self) {
        if self.buffers.take().is_some() {
            debug!("released scan resources");
        }
    }

    fn summary(&self) -> Summary {
        summarize(
            "scan",
            self.size,
            self.validation.as_ref(),
            &self.timings,
            self.cpu_timing.as_ref(),
        )
    }
}

impl<D: Device> Drop for ScanTask<D> {
    fn drop(&mut self) {
        ComputeTask::<D>::release_resources(self);
    }
}
