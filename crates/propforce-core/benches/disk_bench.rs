// ─────────────────────────────────────────────────────────────────────
// PropForce — Actuator Disk Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use propforce_core::disk::ActuatorDiskModel;
use propforce_core::presets::LoadingPreset;
use propforce_core::sweep::{par_performance_sweep, performance_sweep};
use propforce_types::state::{FlowState, Geometry};
use std::hint::black_box;

fn bench_compute_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_performance");
    let geom = Geometry::with_diameter(0.254).unwrap();
    let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
    let coeffs = LoadingPreset::Elliptic.coefficients();

    for n_stations in [30usize, 120, 480] {
        let model = ActuatorDiskModel::with_stations(geom, n_stations, 0.95).unwrap();
        group.bench_function(format!("stations_{n_stations}"), |b| {
            b.iter(|| black_box(model.compute_performance(black_box(&coeffs), &flow)))
        });
    }

    group.finish();
}

fn bench_rpm_sweep(c: &mut Criterion) {
    let model =
        ActuatorDiskModel::with_stations(Geometry::with_diameter(0.254).unwrap(), 30, 0.95)
            .unwrap();
    let coeffs = LoadingPreset::Elliptic.coefficients();
    let rpms: Vec<f64> = (0..50).map(|i| 1000.0 + 200.0 * i as f64).collect();

    c.bench_function("rpm_sweep_50", |b| {
        b.iter(|| {
            let sweep = performance_sweep(&model, &coeffs, &rpms, 10.0, 1.225)
                .expect("sweep over positive rpm should succeed");
            black_box(sweep.thrust.len())
        })
    });

    c.bench_function("rpm_sweep_50_parallel", |b| {
        b.iter(|| {
            let sweep = par_performance_sweep(&model, &coeffs, &rpms, 10.0, 1.225)
                .expect("sweep over positive rpm should succeed");
            black_box(sweep.thrust.len())
        })
    });
}

criterion_group!(benches, bench_compute_performance, bench_rpm_sweep);
criterion_main!(benches);
