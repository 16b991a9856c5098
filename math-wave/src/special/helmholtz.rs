//! Asymptotic 2D Helmholtz kernel and its radial derivatives
//!
//! The outgoing cylindrical wave radiated by a point source is built from
//! the large-argument expansion of the zeroth-order Hankel function:
//! ```text
//! H₀(x) ≈ √(2/(πx)) · exp(i(x − π/4))
//! ```
//!
//! The derivatives below are the exact derivatives of this asymptotic
//! form, not of the true Bessel/Neumann combination. They agree with the
//! latter only for large `x`; callers keep `x` away from zero through the
//! damping gate of [`crate::PhysicalParameters`].

use num_complex::Complex64;
use std::f64::consts::{FRAC_PI_4, PI};

/// Common phase factor `exp(i(x − π/4))`
#[inline]
fn phase(x: f64) -> Complex64 {
    Complex64::from_polar(1.0, x - FRAC_PI_4)
}

/// Large-argument Hankel approximation `√(2/(πx)) · exp(i(x − π/4))`
///
/// # Example
/// ```
/// use math_water_wave::special::hankel;
///
/// let h = hankel(10.0);
/// // |H₀(x)| = √(2/(πx))
/// assert!((h.norm() - (2.0 / (std::f64::consts::PI * 10.0)).sqrt()).abs() < 1e-12);
/// ```
#[inline]
pub fn hankel(x: f64) -> Complex64 {
    (2.0 / (PI * x)).sqrt() * phase(x)
}

/// First derivative of [`hankel`]: `(i − 1/(2x)) · H₀(x)`
#[inline]
pub fn derivative_hankel(x: f64) -> Complex64 {
    Complex64::new(-0.5 / x, 1.0) * hankel(x)
}

/// Second derivative of [`hankel`]
///
/// ```text
/// H₀''(x) = √(2/π) · (¾ x^(-5/2) − i x^(-3/2) − x^(-1/2)) · exp(i(x − π/4))
/// ```
#[inline]
pub fn second_derivative_hankel(x: f64) -> Complex64 {
    let radial = Complex64::new(0.75 * x.powf(-2.5) - x.powf(-0.5), -x.powf(-1.5));
    (2.0 / PI).sqrt() * radial * phase(x)
}

/// Green's weight `(−i/4) · H₀(x)` of a unit point source
///
/// Every source evaluation goes through this kernel; `x = k·r`.
#[inline]
pub fn greens_weight(x: f64) -> Complex64 {
    Complex64::new(0.0, -0.25) * hankel(x)
}

/// Radial derivative of [`greens_weight`] with respect to `x`
#[inline]
pub fn greens_weight_derivative(x: f64) -> Complex64 {
    Complex64::new(0.0, -0.25) * derivative_hankel(x)
}

/// Second radial derivative of [`greens_weight`] with respect to `x`
#[inline]
pub fn greens_weight_second_derivative(x: f64) -> Complex64 {
    Complex64::new(0.0, -0.25) * second_derivative_hankel(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spec_math::Bessel;

    const EPSILON: f64 = 1e-10;

    /// Central finite difference of a complex function
    fn central_difference(f: impl Fn(f64) -> Complex64, x: f64, h: f64) -> Complex64 {
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn test_hankel_magnitude() {
        for &x in &[0.5, 1.0, 7.3, 42.0] {
            assert_relative_eq!(hankel(x).norm(), (2.0 / (PI * x)).sqrt(), epsilon = EPSILON);
        }
    }

    #[test]
    fn test_hankel_phase_at_quarter_period() {
        // At x = π/4 the phase factor is exactly 1
        let h = hankel(FRAC_PI_4);
        assert!(h.im.abs() < EPSILON);
        assert!(h.re > 0.0);
    }

    #[test]
    fn test_asymptotic_matches_bessel_for_large_argument() {
        // J₀ + iY₀ ~ √(2/(πx)) exp(i(x − π/4)) with O(1/x) relative error
        for &x in &[30.0_f64, 60.0, 120.0] {
            let exact = Complex64::new(x.bessel_jv(0.0), x.bessel_yv(0.0));
            let rel = (hankel(x) - exact).norm() / exact.norm();
            assert!(rel < 1.0 / x, "x = {}, relative error {}", x, rel);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        for &x in &[2.0, 5.5, 20.0] {
            let fd = central_difference(hankel, x, 1e-5);
            assert!((derivative_hankel(x) - fd).norm() < 1e-7);
        }
    }

    #[test]
    fn test_second_derivative_matches_finite_difference() {
        for &x in &[2.0, 5.5, 20.0] {
            let fd = central_difference(derivative_hankel, x, 1e-5);
            assert!((second_derivative_hankel(x) - fd).norm() < 1e-7);
        }
    }

    #[test]
    fn test_greens_weight_scaling() {
        let x = 3.7;
        let g = greens_weight(x);
        assert_relative_eq!(g.norm(), 0.25 * hankel(x).norm(), epsilon = EPSILON);
        // −i/4 rotates by −π/2
        let expected = hankel(x) * Complex64::new(0.0, -0.25);
        assert!((g - expected).norm() < EPSILON);
        assert!((greens_weight_derivative(x) - Complex64::new(0.0, -0.25) * derivative_hankel(x)).norm() < EPSILON);
    }
}
