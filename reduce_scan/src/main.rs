use clap::{Parser, ValueEnum};
use reduce_scan::config::{DEFAULT_LOCAL_WORK_SIZE, DEFAULT_MIN_GROUP_SIZE, DEFAULT_PROBLEM_SIZE};
use reduce_scan::{
    report, ComputeTask, Device, HostDevice, InputPattern, ReductionTask, RunConfig, ScanTask,
};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TaskKind {
    Reduction,
    Scan,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputKind {
    Ones,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DeviceKind {
    Host,
    Cuda,
}

/// Validates and times every reduction and scan variant.
#[derive(Parser, Debug)]
#[command(name = "reduce_scan")]
#[command(version)]
struct Cli {
    #[arg(long, value_enum, default_value_t = TaskKind::All)]
    task: TaskKind,

    /// Number of input elements
    #[arg(short = 'n', long, default_value_t = DEFAULT_PROBLEM_SIZE)]
    size: usize,

    /// Work-group size, a power of two up to 1024
    #[arg(short, long, default_value_t = DEFAULT_LOCAL_WORK_SIZE[0])]
    local_work_size: usize,

    /// Group size the work-efficient scan lays its levels out for
    #[arg(long, default_value_t = DEFAULT_MIN_GROUP_SIZE)]
    min_group_size: usize,

    /// Timed repetitions per variant
    #[arg(long)]
    perf_iterations: Option<usize>,

    /// Timed repetitions of the CPU reference
    #[arg(long)]
    cpu_iterations: Option<usize>,

    #[arg(long, value_enum, default_value_t = InputKind::Ones)]
    input: InputKind,

    /// Seed for random input
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = DeviceKind::Host)]
    device: DeviceKind,

    /// PTX module holding the kernels, for the cuda device
    #[arg(long)]
    ptx: Option<PathBuf>,
}

impl Cli {
    fn config(&self, defaults: RunConfig) -> RunConfig {
        RunConfig {
            size: self.size,
            local_work_size: [self.local_work_size, 1, 1],
            min_group_size: self.min_group_size,
            perf_iterations: self.perf_iterations.unwrap_or(defaults.perf_iterations),
            cpu_iterations: self.cpu_iterations.unwrap_or(defaults.cpu_iterations),
            input: match self.input {
                InputKind::Ones => InputPattern::Ones,
                InputKind::Random => InputPattern::Random { seed: self.seed },
            },
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                ),
        )
        .init();

    let cli = Cli::parse();
    let passed = match cli.device {
        DeviceKind::Host => run_all(&mut HostDevice::new(), &cli)?,
        DeviceKind::Cuda => run_cuda(&cli)?,
    };
    if !passed {
        return Err("one or more variants failed validation".into());
    }
    Ok(())
}

#[cfg(feature = "cuda")]
fn run_cuda(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let path = cli.ptx.as_ref().ok_or("--ptx is required for the cuda device")?;
    let ptx = std::fs::read_to_string(path)?;
    let mut device = reduce_scan::device::cuda::CudaDevice::new(&ptx)?;
    run_all(&mut device, cli)
}

#[cfg(not(feature = "cuda"))]
fn run_cuda(_cli: &Cli) -> Result<bool, Box<dyn Error>> {
    Err("built without the cuda feature".into())
}

fn run_all<D: Device>(device: &mut D, cli: &Cli) -> Result<bool, Box<dyn Error>> {
    info!(device = device.name(), "starting");
    let mut passed = true;

    if matches!(cli.task, TaskKind::Reduction | TaskKind::All) {
        let config = cli.config(RunConfig::reduction());
        config.validate()?;
        let mut task = ReductionTask::<D>::from_config(&config);
        passed &= run_task(&mut task, device, config.local_work_size)?;
    }
    if matches!(cli.task, TaskKind::Scan | TaskKind::All) {
        let config = cli.config(RunConfig::scan());
        config.validate()?;
        let mut task = ScanTask::<D>::from_config(&config);
        passed &= run_task(&mut task, device, config.local_work_size)?;
    }
    Ok(passed)
}

fn run_task<D: Device>(
    task: &mut impl ComputeTask<D>,
    device: &mut D,
    local_work_size: [usize; 3],
) -> Result<bool, Box<dyn Error>> {
    task.init_resources(device)?;
    task.compute_cpu();
    task.compute_gpu(device, local_work_size)?;
    let passed = task.validate_results();

    println!("{}", report::render(&task.summary()));
    task.release_resources();
    Ok(passed)
}
