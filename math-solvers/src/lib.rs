//! Dense linear solvers and parallel helpers
//!
//! This crate provides the small linear-algebra kernel used to invert
//! source-to-constraint transfer matrices, along with the parallel
//! iteration helpers shared by the surface synthesis.
//!
//! # Features
//!
//! - **Direct solver**: LU decomposition with partial pivoting
//! - **Generic scalars**: works with `Complex64` and `f64`
//! - **Parallel helpers**: rayon-backed with sequential fallbacks
//!
//! # Example
//!
//! ```
//! use math_water_solvers::lu_solve;
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let a = array![
//!     [Complex64::new(2.0, 0.0), Complex64::new(0.0, 1.0)],
//!     [Complex64::new(0.0, -1.0), Complex64::new(3.0, 0.0)],
//! ];
//! let b = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
//! let x = lu_solve(&a, &b).unwrap();
//! assert_eq!(x.len(), 2);
//! ```

pub mod direct;
pub mod parallel;
pub mod traits;

pub use direct::{LuError, LuFactorization, lu_factorize, lu_solve, residual_norm};
pub use traits::ComplexField;
