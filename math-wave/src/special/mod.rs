//! Special functions for linear surface waves
//!
//! - Asymptotic Hankel function H₀ and its first two derivatives
//! - Green's weight `(−i/4) H₀` of a 2D point source
//! - Capillary-gravity dispersion relation and radial damping

pub mod dispersion;
pub mod helmholtz;

pub use dispersion::*;
pub use helmholtz::*;
