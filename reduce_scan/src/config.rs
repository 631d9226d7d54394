use crate::error::{Error, Result};
use kernel_abi::MAX_WORK_GROUP_SIZE;
use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;

pub const DEFAULT_PROBLEM_SIZE: usize = 1 << 20;
pub const DEFAULT_LOCAL_WORK_SIZE: [usize; 3] = [256, 1, 1];
pub const DEFAULT_MIN_GROUP_SIZE: usize = 256;
pub const DEFAULT_PERF_ITERATIONS: usize = 100;
pub const DEFAULT_REDUCTION_CPU_ITERATIONS: usize = 10;
pub const DEFAULT_SCAN_CPU_ITERATIONS: usize = 1;

/// How the input array is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPattern {
    /// Every element is 1, so a sum equals `N` and a scan is `1..=N`.
    #[default]
    Ones,
    /// Seeded random values in `0..16`.
    Random { seed: u64 },
}

impl InputPattern {
    pub fn generate(&self, n: usize) -> Vec<u32> {
        match *self {
            InputPattern::Ones => vec![1; n],
            InputPattern::Random { seed } => {
                let mut rng = Hc128Rng::seed_from_u64(seed);
                (0..n).map(|_| rng.gen::<u32>() & 15).collect()
            }
        }
    }
}

/// Settings for one run of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub size: usize,
    pub local_work_size: [usize; 3],
    /// Group size the work-efficient scan lays its levels out for.
    pub min_group_size: usize,
    pub perf_iterations: usize,
    pub cpu_iterations: usize,
    pub input: InputPattern,
}

impl RunConfig {
    pub fn reduction() -> Self {
        Self {
            size: DEFAULT_PROBLEM_SIZE,
            local_work_size: DEFAULT_LOCAL_WORK_SIZE,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            perf_iterations: DEFAULT_PERF_ITERATIONS,
            cpu_iterations: DEFAULT_REDUCTION_CPU_ITERATIONS,
            input: InputPattern::Ones,
        }
    }

    pub fn scan() -> Self {
        Self {
            cpu_iterations: DEFAULT_SCAN_CPU_ITERATIONS,
            ..Self::reduction()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_problem_size(self.size)?;
        check_local_work_size(self.local_work_size)?;
        check_group_size("minimum group size", self.min_group_size)?;
        if self.perf_iterations == 0 || self.cpu_iterations == 0 {
            return Err(Error::InvalidConfig(
                "iteration counts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub fn check_problem_size(size: usize) -> Result<()> {
    if size == 0 || u32::try_from(size).is_err() {
        return Err(Error::InvalidConfig(format!(
            "problem size {} is outside 1..={}",
            size,
            u32::MAX
        )));
    }
    Ok(())
}

/// Every dimension must be a power of two and the whole group must fit the
/// work-group limit. Only the first dimension is used by the engines.
pub fn check_local_work_size(local: [usize; 3]) -> Result<()> {
    for (dim, &len) in local.iter().enumerate() {
        check_group_size(&format!("local work size [{}]", dim), len)?;
    }
    let total = local.iter().product::<usize>();
    if total > MAX_WORK_GROUP_SIZE {
        return Err(Error::InvalidConfig(format!(
            "local work size {:?} has {} work items, limit is {}",
            local, total, MAX_WORK_GROUP_SIZE
        )));
    }
    Ok(())
}

pub(crate) fn check_group_size(what: &str, len: usize) -> Result<()> {
    if !len.is_power_of_two() || len > MAX_WORK_GROUP_SIZE {
        return Err(Error::InvalidConfig(format!(
            "{} must be a power of two in 1..={}, got {}",
            what, MAX_WORK_GROUP_SIZE, len
        )));
    }
    Ok(())
}
