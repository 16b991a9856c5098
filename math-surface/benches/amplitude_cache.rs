//! Benchmark: band amplitude cache and rendering
//!
//! Measures the two hot paths of the surface:
//! 1. Recomputing the per-band complex caches (bands × sources × cells)
//! 2. Rendering a time step from the caches (bands × cells)
//!
//! Run with:
//!   cargo bench -p math-water-surface --bench amplitude_cache
//!
//! Thread scaling:
//!   RAYON_NUM_THREADS=1 cargo bench -p math-water-surface --bench amplitude_cache

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use math_water_surface::{BandSpacing, SurfaceConfig, WaterSurface};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::time::Duration;

/// Surface with `sources` sources on a circle, three bands
fn surface(n: usize, sources: usize) -> WaterSurface {
    let mut config = SurfaceConfig::single_band(n, n, 0.2, 1.0);
    config.bands.max = 4.0;
    config.bands.spacing = BandSpacing::Ratio(2.0);
    let mut surface = WaterSurface::new(&config).expect("valid configuration");

    let center = surface.center();
    let radius = 0.3 * n as f64 * 0.2;
    for s in 0..sources {
        let theta = 2.0 * PI * s as f64 / sources as f64;
        surface
            .add_eq_source(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
                0.0,
                Complex64::new(1.0, 0.0),
            )
            .expect("valid source");
    }
    surface
}

fn bench_compute_amplitudes(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_amplitudes");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    for &n in &[50, 100, 150] {
        for &sources in &[4, 16] {
            let mut surface = surface(n, sources);
            let work = (n * n * surface.instance_count()) as u64;
            group.throughput(Throughput::Elements(work));

            group.bench_with_input(
                BenchmarkId::new(format!("{}_sources", sources), n),
                &n,
                |b, _| {
                    b.iter(|| {
                        surface.compute_amplitudes().expect("computation");
                        black_box(surface.amplitude_grids(0).is_some())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for &n in &[50, 100, 150] {
        let mut surface = surface(n, 8);
        surface.compute_amplitudes().expect("computation");
        group.throughput(Throughput::Elements((n * n) as u64));

        let mut t = 0.0;
        group.bench_with_input(BenchmarkId::new("three_bands", n), &n, |b, _| {
            b.iter(|| {
                t += 0.03;
                surface.render(t).expect("render");
                black_box(surface.height(n / 2, n / 2))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_amplitudes, bench_render);
criterion_main!(benches);
