//! Multi-band equivalent-source synthesis of water surfaces
//!
//! A [`WaterSurface`] superposes outgoing circular waves radiated by point
//! sources, grouped into wavelength bands. Per band it caches the static
//! complex amplitude over a regular grid; advancing time is then a phase
//! rotation per band instead of a re-evaluation of every source.
//!
//! # Features
//!
//! - **Band caches**: parallel per-row accumulation of source fields
//! - **Time stepping**: `exp(−iωt)` rotation of each band, summed into a rendered grid
//! - **Constraints**: solve source amplitudes so the field hits given heights
//! - **Configuration**: JSON documents with defaults for every section
//! - **Exports**: gnuplot-ready `row col value` records
//!
//! # Example
//!
//! ```
//! use math_water_surface::{ConstraintSolver, SurfaceConfig, WaterSurface};
//!
//! let config = SurfaceConfig::single_band(40, 40, 0.25, 1.0);
//! let mut surface = WaterSurface::new(&config).unwrap();
//! surface.add_constraint(4.0, 5.0, 0.05);
//! surface.add_constraint(6.0, 5.0, -0.02);
//!
//! let solver = ConstraintSolver::default();
//! solver.set_amplis_from_constraints(&mut surface).unwrap();
//! assert!(solver.evaluate_solution(&surface) < 1e-10);
//! ```

pub mod bands;
pub mod config;
pub mod constraint;
pub mod error;
pub mod grid;
pub mod io;
pub mod surface;

pub use bands::{Band, BandSequence, BandSpacing};
pub use config::{BandConfig, GridConfig, SourceConfig, SurfaceConfig, TimeConfig};
pub use constraint::{ConstraintPoint, ConstraintSolver, position_sources};
pub use error::{Result, SurfaceError};
pub use grid::Grid;
pub use io::AmplitudeView;
pub use surface::{
    PlacedSource, SourceId, SourceInstance, StepStatus, SurfacePhase, WaterSurface,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
