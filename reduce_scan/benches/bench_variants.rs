use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode};
use reduce_scan::{
    BufferSet, Device, HostDevice, InputPattern, ReductionEngine, ReductionVariant,
    ScanEngine, ScanVariant, Variant,
};

const SEED: u64 = 0x5eed;
const LOCAL_WORK_SIZE: usize = 256;
const MIN_GROUP_SIZE: usize = 256;

pub fn reduction_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reduction variants");
    group.sample_size(10);
    group.sampling_mode(SamplingMode::Flat);

    for n in [1usize << 16, 1 << 20] {
        let mut device = HostDevice::new();
        device.load_kernels(&ReductionEngine::KERNELS).unwrap();
        let input = InputPattern::Random { seed: SEED }.generate(n);
        let mut buffers = BufferSet::for_reduction(&mut device, input).unwrap();
        let engine = ReductionEngine::new(LOCAL_WORK_SIZE);

        for &variant in ReductionVariant::ALL {
            group.bench_with_input(BenchmarkId::new(variant.name(), n), &n, |b, _| {
                b.iter(|| {
                    buffers.upload(&mut device, variant.slot()).unwrap();
                    engine.reduce(&mut device, &mut buffers, variant).unwrap()
                })
            });
        }
    }

    group.finish();
}

pub fn scan_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scan variants");
    group.sample_size(10);
    group.sampling_mode(SamplingMode::Flat);

    for n in [1usize << 16, 1 << 20] {
        let mut device = HostDevice::new();
        device.load_kernels(&ScanEngine::KERNELS).unwrap();
        let input = InputPattern::Random { seed: SEED }.generate(n);
        let mut buffers = BufferSet::for_scan(&mut device, input, MIN_GROUP_SIZE).unwrap();
        let engine = ScanEngine::new(LOCAL_WORK_SIZE);

        for &variant in ScanVariant::ALL {
            group.bench_with_input(BenchmarkId::new(variant.name(), n), &n, |b, _| {
                b.iter(|| {
                    buffers.upload(&mut device, variant.slot()).unwrap();
                    engine.scan(&mut device, &mut buffers, variant).unwrap()
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, reduction_comparison, scan_comparison);
criterion_main!(benches);
