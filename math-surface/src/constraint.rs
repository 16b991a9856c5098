//! Source amplitudes from point height constraints
//!
//! [`ConstraintSolver`] places `N` auxiliary sources evenly by angle on an
//! ellipse around the grid center, builds the `N × N` complex matrix of
//! source-to-constraint transfer coefficients and solves it with a dense
//! LU factorization, so that the rendered field takes the desired height
//! at each of the `N` constraint points.

use crate::error::{Result, SurfaceError};
use crate::surface::{SourceId, WaterSurface};
use math_water_solvers::parallel::parallel_map;
use math_water_solvers::{LuError, lu_factorize, residual_norm};
use math_water_wave::{EquivalentSource, Point2D};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of sources placed when none is specified
pub const DEFAULT_SOURCE_COUNT: usize = 2;

/// Ellipse radii as a fraction of the grid extent in each direction
pub const ELLIPSE_FILL: f64 = 0.45;

/// Transfer coefficients below this magnitude are not divided by
pub const MIN_TRANSFER: f64 = 1e-12;

/// Desired height at a world position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintPoint {
    /// X position (m)
    pub x: f64,
    /// Y position (m)
    pub y: f64,
    /// Desired height (m)
    pub height: f64,
}

impl ConstraintPoint {
    /// Desired `height` at `(x, y)`
    pub fn new(x: f64, y: f64, height: f64) -> Self {
        Self { x, y, height }
    }

    /// World position of the constraint
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// `n` points evenly spaced by angle on the ellipse inscribed in the grid
///
/// Radii are [`ELLIPSE_FILL`] times the grid extent along x (rows) and y
/// (columns); the first point lies on the +x axis.
pub fn position_sources(n: usize, rows: usize, cols: usize, cell_size: f64) -> Vec<Point2D> {
    let center = Point2D::new(
        0.5 * rows as f64 * cell_size,
        0.5 * cols as f64 * cell_size,
    );
    let a = ELLIPSE_FILL * rows as f64 * cell_size;
    let b = ELLIPSE_FILL * cols as f64 * cell_size;

    (0..n)
        .map(|s| {
            let theta = 2.0 * PI * s as f64 / n as f64;
            let (sin, cos) = theta.sin_cos();
            let r = 1.0 / ((cos / a).powi(2) + (sin / b).powi(2)).sqrt();
            Point2D::from_polar_around(center, r, theta)
        })
        .collect()
}

/// Amplitude that makes a source with transfer coefficient `transfer`
/// produce `desired`
///
/// Falls back to unit amplitude, with a warning, when the coefficient is
/// too small to divide by.
pub fn amplitude_for_height(transfer: Complex64, desired: Complex64) -> Complex64 {
    if transfer.norm() < MIN_TRANSFER {
        log::warn!(
            "Transfer coefficient {:e} too small; using unit amplitude",
            transfer.norm()
        );
        Complex64::new(1.0, 0.0)
    } else {
        desired / transfer
    }
}

/// Set the amplitude of `source` so its static field at `point` has real
/// part `desired`
pub fn set_amplitude_from_point(source: &mut EquivalentSource, point: Point2D, desired: f64) {
    let mut unit = source.clone();
    unit.set_amplitude(Complex64::new(1.0, 0.0));
    let transfer = unit.heightc_static(point.x, point.y);
    source.set_amplitude(amplitude_for_height(transfer, Complex64::new(desired, 0.0)));
}

/// Solver for source amplitudes matching the surface's height constraints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintSolver {
    source_count: usize,
    wavelength: f64,
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_COUNT)
    }
}

impl ConstraintSolver {
    /// Solver placing `source_count` sources in the coarsest band
    pub fn new(source_count: usize) -> Self {
        Self {
            source_count,
            wavelength: 0.0,
        }
    }

    /// Place the solved sources at `wavelength` (`0.0` for the coarsest band)
    pub fn with_wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = wavelength;
        self
    }

    /// Number of sources placed, and of constraints required
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Requested wavelength of the placed sources
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Where the sources go on `surface`
    pub fn source_positions(&self, surface: &WaterSurface) -> Vec<Point2D> {
        position_sources(
            self.source_count,
            surface.rows(),
            surface.cols(),
            surface.cell_size(),
        )
    }

    fn check_arity(&self, surface: &WaterSurface) -> Result<()> {
        let got = surface.constraints().len();
        if got != self.source_count {
            return Err(SurfaceError::ConstraintCountMismatch {
                expected: self.source_count,
                got,
            });
        }
        Ok(())
    }

    /// `M[c][s]`: field of unit-amplitude source `s` at constraint `c`
    ///
    /// Every band the source would be placed in contributes, rotated to the
    /// surface's current time.
    pub fn transfer_matrix(&self, surface: &WaterSurface) -> Result<Array2<Complex64>> {
        self.check_arity(surface)?;
        let positions = self.source_positions(surface);
        let time = surface.time();
        let n = self.source_count;

        let mut matrix = Array2::zeros((n, n));
        for (c, constraint) in surface.constraints().iter().enumerate() {
            for (s, position) in positions.iter().enumerate() {
                matrix[[c, s]] = surface.transfer_coefficient(
                    *position,
                    self.wavelength,
                    constraint.position(),
                    time,
                )?;
            }
        }
        Ok(matrix)
    }

    /// Desired heights minus the field the existing sources already produce
    pub fn right_hand_side(&self, surface: &WaterSurface) -> Array1<Complex64> {
        let time = surface.time();
        let rhs = parallel_map(surface.constraints(), |c| {
            Complex64::new(c.height, 0.0) - surface.complex_height_at_world(c.x, c.y, time)
        });
        Array1::from(rhs)
    }

    /// Solve for the amplitudes of the placed sources
    ///
    /// A singular transfer matrix is not fatal: each amplitude is then
    /// derived from its own diagonal coefficient alone.
    ///
    /// # Errors
    /// [`SurfaceError::ConstraintCountMismatch`] unless the surface holds
    /// exactly [`ConstraintSolver::source_count`] constraints.
    pub fn solve_amplitudes(&self, surface: &WaterSurface) -> Result<Vec<Complex64>> {
        let matrix = self.transfer_matrix(surface)?;
        let rhs = self.right_hand_side(surface);

        let amplitudes = match lu_factorize(&matrix) {
            Ok(lu) => {
                let x = lu.solve(&rhs)?;
                log::debug!(
                    "Constraint solve: pivot ratio {:.2e}, residual {:.2e}",
                    lu.pivot_ratio(),
                    residual_norm(&matrix, &x, &rhs)
                );
                x
            }
            Err(LuError::SingularMatrix { column, pivot }) => {
                log::warn!(
                    "Transfer matrix singular (pivot {:e} in column {}); solving per source",
                    pivot,
                    column
                );
                (0..self.source_count)
                    .map(|s| amplitude_for_height(matrix[[s, s]], rhs[s]))
                    .collect()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(amplitudes.to_vec())
    }

    /// Solve, add the placed sources to `surface` and re-render it
    ///
    /// The surface is recomputed at its current time; the ids of the new
    /// sources are returned in placement order.
    pub fn set_amplis_from_constraints(
        &self,
        surface: &mut WaterSurface,
    ) -> Result<Vec<SourceId>> {
        let amplitudes = self.solve_amplitudes(surface)?;
        let positions = self.source_positions(surface);

        let mut ids = Vec::with_capacity(amplitudes.len());
        for (position, amplitude) in positions.iter().zip(&amplitudes) {
            let id = surface.add_eq_source(position.x, position.y, self.wavelength, *amplitude)?;
            ids.push(id);
        }
        surface.recompute(surface.time())?;

        log::info!(
            "Placed {} constrained sources, squared error {:.3e}",
            ids.len(),
            self.evaluate_solution(surface)
        );
        Ok(ids)
    }

    /// Sum of squared differences between rendered and desired heights
    ///
    /// The field is evaluated from the sources at each constraint's exact
    /// position and the rendered time; on grid nodes this is the rendered
    /// cell value.
    pub fn evaluate_solution(&self, surface: &WaterSurface) -> f64 {
        let time = surface.rendered_time();
        surface
            .constraints()
            .iter()
            .map(|c| (surface.height_at_world(c.x, c.y, time) - c.height).powi(2))
            .sum()
    }
}
