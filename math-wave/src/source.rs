//! Equivalent point source
//!
//! A single outgoing circular wave anchored at a point:
//! ```text
//! η(x, y) = D(r, k) · (−i/4) H₀(k r) · A        r = |(x, y) − p|
//! ```
//! where `D` is the radial damping and `A` the complex amplitude. The
//! amplitude is a time-independent phasor; time evolution is the rotation
//! `exp(−iωt)` applied by [`EquivalentSource::phase_rotation`].
//!
//! Contributions are gated: the value is exactly zero at the source itself
//! and wherever the damping factor falls to the validity cutoff or below.

use crate::error::{Result, WaveError};
use crate::physics::PhysicalParameters;
use crate::special::{greens_weight, greens_weight_derivative, greens_weight_second_derivative};
use crate::types::{Mat2c, Point2D, Vec2c};
use num_complex::Complex64;

/// One point emitter at a fixed wavelength
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalentSource {
    wavelength: f64,
    wave_number: f64,
    angular_frequency: f64,
    position: Point2D,
    amplitude: Complex64,
    params: PhysicalParameters,
}

/// Polar geometry of a query point relative to a source
#[derive(Debug, Clone, Copy)]
struct Geometry {
    r: f64,
    cos_phi: f64,
    sin_phi: f64,
}

impl EquivalentSource {
    /// Create a unit-amplitude source at the origin
    ///
    /// # Errors
    /// [`WaveError::InvalidWavelength`] if `wavelength` is not finite and positive.
    pub fn new(wavelength: f64, params: PhysicalParameters) -> Result<Self> {
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(WaveError::InvalidWavelength { wavelength });
        }
        let wave_number = crate::special::wave_number(wavelength);
        Ok(Self {
            wavelength,
            wave_number,
            angular_frequency: params.dispersion(wave_number),
            position: Point2D::origin(),
            amplitude: Complex64::new(1.0, 0.0),
            params,
        })
    }

    /// Create a source at `(x, y)` with the given amplitude
    pub fn at(
        wavelength: f64,
        params: PhysicalParameters,
        x: f64,
        y: f64,
        amplitude: Complex64,
    ) -> Result<Self> {
        let mut source = Self::new(wavelength, params)?;
        source.set_position(x, y);
        source.set_amplitude(amplitude);
        Ok(source)
    }

    /// A fresh source sharing this one's wavelength and parameters,
    /// placed at the origin with unit amplitude.
    pub fn sibling(&self) -> Self {
        Self {
            position: Point2D::origin(),
            amplitude: Complex64::new(1.0, 0.0),
            ..self.clone()
        }
    }

    fn geometry(&self, x: f64, y: f64) -> Option<Geometry> {
        let rx = x - self.position.x;
        let ry = y - self.position.y;
        let r = rx.hypot(ry);
        if r == 0.0 {
            return None;
        }
        Some(Geometry {
            r,
            cos_phi: rx / r,
            sin_phi: ry / r,
        })
    }

    /// Geometry and damping of a point that passes the validity gate
    fn gated(&self, x: f64, y: f64) -> Option<(Geometry, f64)> {
        let geometry = self.geometry(x, y)?;
        let damp = self.params.damping(geometry.r, self.wave_number);
        self.params.passes_gate(damp).then_some((geometry, damp))
    }

    /// Real height at `(x, y)`
    ///
    /// The amplitude is a phasor, so `time` does not rotate it; band
    /// aggregation applies `exp(−iωt)` when rendering.
    pub fn height(&self, x: f64, y: f64, time: f64) -> f64 {
        self.heightc(x, y, time).re
    }

    /// Real height at a point
    pub fn height_at(&self, p: Point2D, time: f64) -> f64 {
        self.height(p.x, p.y, time)
    }

    /// Complex height at `(x, y)`
    ///
    /// `D(r, k) · (−i/4) H₀(kr) · A`, or zero when the point coincides
    /// with the source or fails the damping gate.
    pub fn heightc(&self, x: f64, y: f64, _time: f64) -> Complex64 {
        match self.gated(x, y) {
            Some((g, damp)) => damp * greens_weight(self.wave_number * g.r) * self.amplitude,
            None => Complex64::new(0.0, 0.0),
        }
    }

    /// Complex height at a point
    pub fn heightc_at(&self, p: Point2D, time: f64) -> Complex64 {
        self.heightc(p.x, p.y, time)
    }

    /// Static complex height snapshot (t = 0)
    pub fn heightc_static(&self, x: f64, y: f64) -> Complex64 {
        self.heightc(x, y, 0.0)
    }

    /// Phase rotation `exp(−iωt)` of this source's band
    #[inline]
    pub fn phase_rotation(&self, time: f64) -> Complex64 {
        Complex64::from_polar(1.0, -self.angular_frequency * time)
    }

    /// Contribution of this source to the rendered field at time `t`
    pub fn evolved_height(&self, x: f64, y: f64, time: f64) -> f64 {
        (self.heightc_static(x, y) * self.phase_rotation(time)).re
    }

    /// Complex gradient (∂η/∂x, ∂η/∂y)
    ///
    /// Radial chain rule on the Green's weight. The term carrying the
    /// derivative of the damping factor is kept in the formula but its
    /// coefficient is zero, so the gradient loses accuracy where damping
    /// varies quickly.
    pub fn grad_heightc(&self, x: f64, y: f64, _time: f64) -> Vec2c {
        let zero = Complex64::new(0.0, 0.0);
        let Some((g, damp)) = self.gated(x, y) else {
            return [zero, zero];
        };
        let kr = self.wave_number * g.r;
        let damping_derivative = 0.0;

        let radial = damp * self.wave_number * greens_weight_derivative(kr) * self.amplitude;
        let tangential = damping_derivative / g.r * greens_weight(kr) * self.amplitude;

        [
            g.cos_phi * radial - g.sin_phi * tangential,
            g.sin_phi * radial + g.cos_phi * tangential,
        ]
    }

    /// Static gradient snapshot (t = 0)
    pub fn grad_heightc_static(&self, x: f64, y: f64) -> Vec2c {
        self.grad_heightc(x, y, 0.0)
    }

    /// Complex Hessian of the unit-amplitude, undamped Green's weight
    ///
    /// Only the radial second-derivative term is kept:
    /// `k² G''(kr)` scaled by cos²φ, cosφ·sinφ and sin²φ. Zero at the
    /// source position.
    pub fn hess_heightc(&self, x: f64, y: f64) -> Mat2c {
        let zero = Complex64::new(0.0, 0.0);
        let Some(g) = self.geometry(x, y) else {
            return [[zero, zero], [zero, zero]];
        };
        let curvature = self.wave_number
            * self.wave_number
            * greens_weight_second_derivative(self.wave_number * g.r);
        let cross = g.cos_phi * g.sin_phi * curvature;
        [
            [g.cos_phi * g.cos_phi * curvature, cross],
            [cross, g.sin_phi * g.sin_phi * curvature],
        ]
    }

    /// Damping factor between the source and `(x, y)`
    pub fn damping_at(&self, x: f64, y: f64) -> f64 {
        self.params.damping(self.distance(x, y), self.wave_number)
    }

    /// Move the source
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Point2D::new(x, y);
    }

    /// Replace the complex amplitude
    pub fn set_amplitude(&mut self, amplitude: Complex64) {
        self.amplitude = amplitude;
    }

    /// Source position
    pub fn position(&self) -> Point2D {
        self.position
    }

    /// Complex amplitude
    pub fn amplitude(&self) -> Complex64 {
        self.amplitude
    }

    /// Wavelength λ
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Wave number k = 2π/λ
    pub fn wave_number(&self) -> f64 {
        self.wave_number
    }

    /// Angular frequency ω(k)
    pub fn angular_frequency(&self) -> f64 {
        self.angular_frequency
    }

    /// Physical parameters the source was built with
    pub fn parameters(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Distance from the source to `(x, y)`
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        self.position.distance_to(&Point2D::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::hankel;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn unit_source(wavelength: f64) -> EquivalentSource {
        EquivalentSource::new(wavelength, PhysicalParameters::default()).unwrap()
    }

    #[test]
    fn test_rejects_bad_wavelength() {
        let params = PhysicalParameters::default();
        assert!(EquivalentSource::new(0.0, params).is_err());
        assert!(EquivalentSource::new(-2.0, params).is_err());
        assert!(EquivalentSource::new(f64::NAN, params).is_err());
    }

    #[test]
    fn test_derived_quantities() {
        let s = unit_source(1.0);
        assert_relative_eq!(s.wave_number(), 2.0 * PI, epsilon = 1e-12);
        let k = 2.0 * PI;
        assert_relative_eq!(
            s.angular_frequency(),
            (9.81 * k + 0.074e-3 * k.powi(3)).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_at_source_position() {
        let mut s = unit_source(1.0);
        s.set_position(1.5, -2.0);
        assert_eq!(s.height(1.5, -2.0, 0.0), 0.0);
        assert_eq!(s.heightc(1.5, -2.0, 3.0), Complex64::new(0.0, 0.0));
        assert_eq!(s.grad_heightc_static(1.5, -2.0)[0], Complex64::new(0.0, 0.0));
        assert_eq!(s.hess_heightc(1.5, -2.0)[1][1], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_hand_computed_value_at_five() {
        // λ = 1, A = 1, query (5, 0), no damping
        let s = unit_source(1.0);
        let k = 2.0 * PI;
        let x = 5.0 * k;
        let expected = Complex64::new(0.0, -0.25)
            * (2.0 / (PI * x)).sqrt()
            * Complex64::new((x - PI / 4.0).cos(), (x - PI / 4.0).sin());
        let h = s.heightc(5.0, 0.0, 0.0);
        assert_relative_eq!(h.re, expected.re, epsilon = 1e-12);
        assert_relative_eq!(h.im, expected.im, epsilon = 1e-12);
        assert_relative_eq!(s.height(5.0, 0.0, 0.0), expected.re, epsilon = 1e-12);
    }

    #[test]
    fn test_matches_closed_form_with_damping() {
        let params = PhysicalParameters::default().with_damping(0.001);
        let amplitude = Complex64::new(0.7, -0.3);
        let s = EquivalentSource::at(0.8, params, 1.0, 1.0, amplitude).unwrap();
        let (x, y) = (3.0, -0.5);
        let r = s.distance(x, y);
        let k = s.wave_number();
        let expected =
            params.damping(r, k) * Complex64::new(0.0, -0.25) * hankel(k * r) * amplitude;
        assert!((s.heightc(x, y, 0.0) - expected).norm() < 1e-12);
    }

    #[test]
    fn test_gate_region_is_connected() {
        // exp(−c k² r) ≤ 0.02 once r ≥ ln(50)/(c k²); contribution must stay zero beyond
        let params = PhysicalParameters::default().with_damping(0.01);
        let s = EquivalentSource::new(1.0, params).unwrap();
        let k = s.wave_number();
        let r_cut = 50.0_f64.ln() / (0.01 * k * k);
        assert!(s.heightc(r_cut * 0.95, 0.0, 0.0).norm() > 0.0);
        let mut r = r_cut * 1.001;
        while r < r_cut * 5.0 {
            assert_eq!(s.height(r, 0.0, 0.0), 0.0);
            r += 0.37;
        }
    }

    #[test]
    fn test_time_argument_does_not_rotate_phasor() {
        let s = unit_source(2.0);
        assert_eq!(s.heightc(3.0, 4.0, 0.0), s.heightc(3.0, 4.0, 12.5));
    }

    #[test]
    fn test_evolved_height_is_periodic() {
        let s = unit_source(1.3);
        let period = 2.0 * PI / s.angular_frequency();
        let t = 0.37;
        assert_relative_eq!(
            s.evolved_height(2.0, 1.0, t),
            s.evolved_height(2.0, 1.0, t + period),
            epsilon = 1e-10
        );
        assert_relative_eq!(s.evolved_height(2.0, 1.0, 0.0), s.height(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_gradient_matches_finite_difference_without_damping() {
        let amplitude = Complex64::new(1.0, 0.5);
        let s = EquivalentSource::at(1.0, PhysicalParameters::default(), 0.5, 0.5, amplitude)
            .unwrap();
        let (x, y, h) = (3.2, 2.1, 1e-6);
        let grad = s.grad_heightc_static(x, y);
        let fd_x = (s.heightc_static(x + h, y) - s.heightc_static(x - h, y)) / (2.0 * h);
        let fd_y = (s.heightc_static(x, y + h) - s.heightc_static(x, y - h)) / (2.0 * h);
        assert!((grad[0] - fd_x).norm() < 1e-6);
        assert!((grad[1] - fd_y).norm() < 1e-6);
    }

    #[test]
    fn test_gradient_ignores_damping_variation() {
        // Known limitation: with damping the gradient lacks the ∂D/∂r term
        let params = PhysicalParameters::default().with_damping(0.02);
        let s = EquivalentSource::new(1.0, params).unwrap();
        let (x, y, h) = (2.0, 0.0, 1e-6);
        let fd_x = (s.heightc_static(x + h, y) - s.heightc_static(x - h, y)) / (2.0 * h);
        let grad = s.grad_heightc_static(x, y);
        let k = s.wave_number();
        let radial_only = s.damping_at(x, y) * k * greens_weight_derivative(k * x);
        assert!((grad[0] - radial_only).norm() < 1e-12);
        assert!((grad[0] - fd_x).norm() > 1e-6);
    }

    #[test]
    fn test_hessian_is_symmetric() {
        let s = unit_source(1.0);
        let hess = s.hess_heightc(2.0, 3.0);
        assert_eq!(hess[0][1], hess[1][0]);
        // Along the x-axis only the xx entry survives
        let axis = s.hess_heightc(4.0, 0.0);
        assert!(axis[0][0].norm() > 0.0);
        assert!(axis[1][1].norm() < 1e-15);
        assert!(axis[0][1].norm() < 1e-15);
    }

    #[test]
    fn test_sibling_resets_position_and_amplitude() {
        let mut s = unit_source(0.6);
        s.set_position(4.0, 4.0);
        s.set_amplitude(Complex64::new(3.0, 1.0));
        let sibling = s.sibling();
        assert_eq!(sibling.wavelength(), 0.6);
        assert_eq!(sibling.position(), Point2D::origin());
        assert_eq!(sibling.amplitude(), Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_zero_amplitude_gives_zero_field() {
        let mut s = unit_source(1.0);
        s.set_amplitude(Complex64::new(0.0, 0.0));
        assert_eq!(s.height(3.0, 0.0, 0.0), 0.0);
    }
}
