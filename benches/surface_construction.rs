use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use volforge::garch::{GarchFitter, GarchModel};
use volforge::surface::{InterpolationMethod, VolatilitySurfaceBuilder};

/// Skewed smile quotes on an `n_tenors` × `n_strikes` grid around spot 100.
fn generate_surface_data(n_tenors: usize, n_strikes: usize) -> Vec<(f64, f64, f64)> {
    let mut points = Vec::with_capacity(n_tenors * n_strikes);
    for i in 1..=n_tenors {
        let t = i as f64 * 0.25;
        for j in 0..n_strikes {
            let k = 80.0 + 40.0 * (j as f64 / (n_strikes - 1) as f64);
            let m = k / 100.0 - 1.0;
            let vol = 0.35 - 0.2 * m + 0.5 * m * m + 0.02 * t.sqrt();
            points.push((k, t, vol));
        }
    }
    points
}

/// Seeded GARCH(1,1) returns.
fn generate_returns(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut var: f64 = 2e-4;
    (0..n)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut rng);
            let e = var.sqrt() * z;
            var = 1e-5 + 0.08 * e * e + 0.87 * var;
            e
        })
        .collect()
}

fn surface_construction_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_construction");

    // 5 tenors x 10 strikes
    let small = generate_surface_data(5, 10);
    for method in InterpolationMethod::ALL {
        group.bench_function(format!("{method}_5x10_res50"), |b| {
            b.iter(|| {
                let mut builder = VolatilitySurfaceBuilder::new();
                builder.add_points(black_box(&small)).unwrap();
                builder.build_surface(method, 50).unwrap().defined_count()
            });
        });
    }

    // 12 tenors x 25 strikes
    let large = generate_surface_data(12, 25);
    for method in InterpolationMethod::ALL {
        group.bench_function(format!("{method}_12x25_res50"), |b| {
            b.iter(|| {
                let mut builder = VolatilitySurfaceBuilder::new();
                builder.add_points(black_box(&large)).unwrap();
                builder.build_surface(method, 50).unwrap().defined_count()
            });
        });
    }

    group.finish();
}

fn garch_fit_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("garch_fit");

    let returns = generate_returns(500);
    for model in [GarchModel::Garch, GarchModel::Egarch, GarchModel::GjrGarch] {
        group.bench_function(format!("{model:?}_500"), |b| {
            b.iter(|| GarchFitter::new(model).fit(black_box(&returns)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, surface_construction_benchmarks, garch_fit_benchmarks);
criterion_main!(benches);
