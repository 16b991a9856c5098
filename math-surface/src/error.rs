//! Error types for surface configuration, synthesis and I/O
//!
//! Geometry singularities never show up here: a query point on top of a
//! source yields a zero contribution, not an error. What does show up is
//! misconfiguration (rejected before any grid is computed), constraint
//! arity mismatches, and failures of the text/JSON interchange.

use math_water_solvers::LuError;
use math_water_wave::WaveError;
use thiserror::Error;

/// Errors that can occur while configuring or evaluating a surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Grid dimensions must be strictly positive.
    #[error("invalid grid dimensions: {rows}x{cols} (both must be > 0)")]
    InvalidGrid {
        /// Requested row count
        rows: usize,
        /// Requested column count
        cols: usize,
    },

    /// Cell size must be finite and strictly positive.
    #[error("invalid cell size: {cell_size} (must be finite and > 0)")]
    InvalidCellSize {
        /// The rejected cell size
        cell_size: f64,
    },

    /// The wavelength band sequence cannot be built.
    #[error("invalid band sequence [{min}, {max}]: {reason}")]
    InvalidBands {
        /// Smallest wavelength
        min: f64,
        /// Largest wavelength
        max: f64,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Time step must be finite and strictly positive.
    #[error("invalid time step: {dt} (must be finite and > 0)")]
    InvalidTimeStep {
        /// The rejected time step
        dt: f64,
    },

    /// The constraint count does not match the solver arity.
    #[error("constraint count mismatch: solver places {expected} sources, got {got} constraints")]
    ConstraintCountMismatch {
        /// Number of sources the solver places
        expected: usize,
        /// Number of constraints on the surface
        got: usize,
    },

    /// No logical source with this id.
    #[error("unknown source id {0}")]
    UnknownSource(u64),

    /// No band with this index.
    #[error("unknown band index {0}")]
    UnknownBand(usize),

    /// Recomputation was interrupted between two bands.
    #[error("amplitude computation cancelled")]
    Cancelled,

    /// A grid read from text does not match the expected layout.
    #[error("grid record error at line {line}: {message}")]
    Record {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Source construction or physical parameter failure.
    #[error(transparent)]
    Wave(#[from] WaveError),

    /// Dense solver failure.
    #[error("linear solve failed: {0}")]
    Solver(#[from] LuError),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration failure.
    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for surface operations.
pub type Result<T> = std::result::Result<T, SurfaceError>;

impl SurfaceError {
    /// Returns `true` if the error comes from invalid configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SurfaceError::InvalidGrid { .. }
                | SurfaceError::InvalidCellSize { .. }
                | SurfaceError::InvalidBands { .. }
                | SurfaceError::InvalidTimeStep { .. }
                | SurfaceError::Wave(WaveError::InvalidParameter { .. })
        )
    }
}
