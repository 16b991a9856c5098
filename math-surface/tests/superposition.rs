//! Superposition Tests
//!
//! The rendered grid must equal the sum of every band instance's own
//! contribution, independent of insertion order, and each band must come
//! back to its starting phase after one period.

use approx::assert_relative_eq;
use math_water_surface::{BandSpacing, SurfaceConfig, WaterSurface};
use math_water_wave::EquivalentSource;
use num_complex::Complex64;

/// Three bands (λ = 1, 2, 4) on a 30 x 26 grid with light damping
fn multi_band_config() -> SurfaceConfig {
    let mut config = SurfaceConfig::single_band(30, 26, 0.2, 1.0);
    config.bands.max = 4.0;
    config.bands.spacing = BandSpacing::Ratio(2.0);
    config.physics.damping = 0.0005;
    config
}

/// (x, y, wavelength, amplitude) of the test sources
fn sources() -> Vec<(f64, f64, f64, Complex64)> {
    vec![
        (1.0, 1.3, 0.0, Complex64::new(1.0, 0.0)),
        (4.1, 2.2, 2.0, Complex64::new(0.3, -0.4)),
        (2.5, 4.7, 1.0, Complex64::new(-0.6, 0.2)),
        (5.3, 0.4, 4.0, Complex64::new(0.0, 0.9)),
    ]
}

fn build(order: &[usize]) -> WaterSurface {
    let mut surface = WaterSurface::new(&multi_band_config()).unwrap();
    let all = sources();
    for &k in order {
        let (x, y, wl, a) = all[k];
        surface.add_eq_source(x, y, wl, a).unwrap();
    }
    surface
}

#[test]
fn test_rendered_equals_sum_of_individual_contributions() {
    let t = 0.83;
    let mut surface = build(&[0, 1, 2, 3]);
    surface.recompute(t).unwrap();

    let params = *surface.parameters();
    let wavelengths = surface.bands().wavelengths();
    let grid = surface.rendered();

    for &(i, j) in &[(0, 0), (7, 11), (15, 3), (29, 25), (20, 20)] {
        let p = grid.world_position(i, j);
        let mut expected = 0.0;
        for &(x, y, wl, a) in &sources() {
            let requested = if wl == 0.0 { 4.0 } else { wl };
            for &band_wl in wavelengths.iter().filter(|&&b| b <= requested) {
                let source = EquivalentSource::at(band_wl, params, x, y, a).unwrap();
                expected += source.evolved_height(p.x, p.y, t);
            }
        }
        assert_relative_eq!(grid[(i, j)], expected, epsilon = 1e-9, max_relative = 1e-9);
    }
}

#[test]
fn test_insertion_order_does_not_matter() {
    let t = 1.7;
    let mut forward = build(&[0, 1, 2, 3]);
    let mut backward = build(&[3, 2, 1, 0]);
    let mut shuffled = build(&[2, 0, 3, 1]);
    forward.recompute(t).unwrap();
    backward.recompute(t).unwrap();
    shuffled.recompute(t).unwrap();

    let reference = forward.rendered();
    for other in [backward.rendered(), shuffled.rendered()] {
        for (a, b) in reference.values().iter().zip(other.values().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12, max_relative = 1e-9);
        }
    }
}

#[test]
fn test_fan_out_with_default_wavelength() {
    let mut surface = WaterSurface::new(&multi_band_config()).unwrap();
    assert_eq!(surface.band_count(), 3);
    surface
        .add_eq_source(1.0, 1.0, 0.0, Complex64::new(1.0, 0.0))
        .unwrap();
    for b in 0..3 {
        assert_eq!(surface.band_source_count(b), 1);
    }
}

#[test]
fn test_each_band_is_periodic() {
    let config = multi_band_config();
    let mut surface = WaterSurface::new(&config).unwrap();
    surface
        .add_eq_source(2.0, 2.0, 0.0, Complex64::new(1.0, 0.0))
        .unwrap();
    surface.compute_amplitudes().unwrap();

    for band in surface.bands() {
        let t = 0.29;
        let a = band.phase_rotation(t);
        let b = band.phase_rotation(t + band.period());
        assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
    }

    // With a single band the whole field repeats
    let mut single = WaterSurface::new(&SurfaceConfig::single_band(20, 20, 0.2, 1.5)).unwrap();
    single
        .add_eq_source(1.0, 2.0, 0.0, Complex64::new(0.5, 0.5))
        .unwrap();
    let period = single.bands().get(0).unwrap().period();
    single.recompute(0.4).unwrap();
    let before = single.rendered();
    single.render(0.4 + period).unwrap();
    let after = single.rendered();
    for (a, b) in before.values().iter().zip(after.values().iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn test_cell_on_source_gets_no_contribution_from_it() {
    // Source exactly on node (5, 5)
    let mut surface = WaterSurface::new(&SurfaceConfig::single_band(10, 10, 0.5, 1.0)).unwrap();
    surface
        .add_eq_source(2.5, 2.5, 0.0, Complex64::new(1.0, 0.0))
        .unwrap();
    surface.recompute(0.0).unwrap();
    assert_eq!(surface.height(5, 5), 0.0);
    assert!(surface.height(5, 7).abs() > 0.0);
}
