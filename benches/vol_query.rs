use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use volforge::OptionType;
use volforge::implied::implied_volatility;
use volforge::pricing::black_scholes;
use volforge::surface::VolatilitySurfaceBuilder;

fn loaded_builder() -> VolatilitySurfaceBuilder {
    let mut builder = VolatilitySurfaceBuilder::new();
    for i in 1..=8 {
        let t = i as f64 * 0.25;
        for j in 0..20 {
            let k = 80.0 + 2.0 * j as f64;
            let m = k / 100.0 - 1.0;
            builder.add_point(k, t, 0.35 - 0.2 * m + 0.5 * m * m).unwrap();
        }
    }
    builder.set_spot(100.0).unwrap();
    builder
}

fn vol_query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("vol_query");

    let builder = loaded_builder();
    // Prime the query triangulation so only lookups are measured.
    let _ = builder.get_vol(100.0, 1.0);

    group.bench_function("get_vol_inside_hull", |b| {
        b.iter(|| builder.get_vol(black_box(97.3), black_box(0.81)));
    });

    group.bench_function("get_vol_outside_hull", |b| {
        b.iter(|| builder.get_vol(black_box(150.0), black_box(3.0)));
    });

    group.bench_function("skew_1y", |b| {
        b.iter(|| builder.calculate_skew(black_box(1.0)));
    });

    group.finish();
}

fn pricing_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pricing");

    group.bench_function("bs_call_price", |b| {
        b.iter(|| {
            black_scholes::call_price(
                black_box(100.0),
                black_box(105.0),
                black_box(0.5),
                black_box(0.03),
                black_box(0.25),
            )
        });
    });

    group.bench_function("bs_greeks", |b| {
        b.iter(|| {
            black_scholes::greeks(
                OptionType::Put,
                black_box(100.0),
                black_box(95.0),
                black_box(0.5),
                black_box(0.03),
                black_box(0.25),
            )
        });
    });

    let price = black_scholes::call_price(100.0, 105.0, 0.5, 0.03, 0.25);
    group.bench_function("implied_vol_newton", |b| {
        b.iter(|| {
            implied_volatility(
                black_box(price),
                100.0,
                105.0,
                0.5,
                0.03,
                OptionType::Call,
            )
            .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, vol_query_benchmarks, pricing_benchmarks);
criterion_main!(benches);
