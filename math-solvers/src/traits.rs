//! Scalar abstraction for the dense solvers
//!
//! [`ComplexField`] covers the two scalar types the surface synthesis
//! needs: `Complex64` for transfer matrices and `f64` for real systems.
//! Magnitudes are always reported as `f64`.

use num_complex::Complex64;
use num_traits::{NumAssign, One, Zero};
use std::fmt::Debug;
use std::ops::Neg;

/// Scalar usable by the LU factorization
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// Squared magnitude |z|²
    fn modulus_sqr(&self) -> f64;

    /// Magnitude |z|
    fn modulus(&self) -> f64 {
        self.modulus_sqr().sqrt()
    }

    /// Whether |z| is below `tol`
    fn is_zero_approx(&self, tol: f64) -> bool {
        self.modulus_sqr() < tol * tol
    }
}

impl ComplexField for Complex64 {
    #[inline]
    fn modulus_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl ComplexField for f64 {
    #[inline]
    fn modulus_sqr(&self) -> f64 {
        *self * *self
    }
}
