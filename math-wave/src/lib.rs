//! Analytic building blocks for linear surface-wave synthesis
//!
//! A height field is synthesized by superposing outgoing circular waves
//! radiated by point emitters ("equivalent sources") instead of solving a
//! PDE over the domain.
//!
//! # Features
//!
//! - **Special functions**: asymptotic Hankel H₀ and derivatives, Green's weight
//! - **Dispersion**: capillary-gravity ω(k) and radial damping
//! - **Sources**: complex height, gradient and Hessian of one emitter
//!
//! # Example
//!
//! ```rust
//! use math_water_wave::{EquivalentSource, PhysicalParameters};
//!
//! let source = EquivalentSource::new(1.0, PhysicalParameters::default()).unwrap();
//! // Exactly zero at the emitter itself
//! assert_eq!(source.height(0.0, 0.0, 0.0), 0.0);
//! assert!(source.heightc(5.0, 0.0, 0.0).norm() > 0.0);
//! ```

pub mod error;
pub mod physics;
pub mod source;
pub mod special;
pub mod types;

pub use error::{Result, WaveError};
pub use physics::{PhysicalParameters, VALIDITY_CUTOFF};
pub use source::EquivalentSource;
pub use types::{Mat2c, Point2D, Vec2c};
