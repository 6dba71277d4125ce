use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pube_core::config::ExperimentConfig;
use pube_model::{build_geometry, sample_partition, MaterialCatalog};

fn partition_benchmark(c: &mut Criterion) {
    let config = ExperimentConfig::default();
    let catalog = MaterialCatalog::from_config(&config).expect("catalog");
    let geometry = build_geometry(&config, &catalog).expect("geometry");

    c.bench_function("partition/reference_2k", |b| {
        b.iter(|| {
            let report = sample_partition(black_box(&geometry), 2_000, 7);
            black_box(report.samples)
        })
    });

    c.bench_function("geometry/build_reference", |b| {
        b.iter(|| build_geometry(black_box(&config), &catalog).expect("geometry"))
    });
}

criterion_group!(benches, partition_benchmark);
criterion_main!(benches);
