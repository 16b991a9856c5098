//! Dense real-valued grid over the simulation domain
//!
//! Cell `(i, j)` sits at world position `(i·h, j·h)` with `h` the cell
//! size: rows run along x, columns along y.
//!
//! Text interchange uses one `row col value` record per line with a blank
//! line after each row, the layout gnuplot reads as a surface.

use crate::error::{Result, SurfaceError};
use math_water_wave::Point2D;
use ndarray::Array2;
use std::io::{BufRead, Write};
use std::ops::{AddAssign, Index, IndexMut};

/// Real grid with a fixed world-space cell size
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    values: Array2<f64>,
    cell_size: f64,
}

impl Grid {
    /// Zero-filled grid
    ///
    /// # Errors
    /// Non-positive dimensions or a non-positive/non-finite cell size.
    pub fn new(rows: usize, cols: usize, cell_size: f64) -> Result<Self> {
        Self::validate_shape(rows, cols, cell_size)?;
        Ok(Self {
            values: Array2::zeros((rows, cols)),
            cell_size,
        })
    }

    /// Wrap an existing array
    pub fn from_array(values: Array2<f64>, cell_size: f64) -> Result<Self> {
        let (rows, cols) = values.dim();
        Self::validate_shape(rows, cols, cell_size)?;
        Ok(Self { values, cell_size })
    }

    pub(crate) fn validate_shape(rows: usize, cols: usize, cell_size: f64) -> Result<()> {
        if rows == 0 || cols == 0 {
            return Err(SurfaceError::InvalidGrid { rows, cols });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SurfaceError::InvalidCellSize { cell_size });
        }
        Ok(())
    }

    /// Number of rows (x direction)
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns (y direction)
    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// World size of one cell
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Whether another grid has the same shape and cell size
    pub fn same_layout(&self, other: &Grid) -> bool {
        self.dim() == other.dim() && self.cell_size == other.cell_size
    }

    /// Underlying array
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Set every cell to `value`
    pub fn reset(&mut self, value: f64) {
        self.values.fill(value);
    }

    /// Value at `(i, j)`, `None` outside the grid
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get((i, j)).copied()
    }

    /// World position of cell `(i, j)`
    #[inline]
    pub fn world_position(&self, i: usize, j: usize) -> Point2D {
        Point2D::new(i as f64 * self.cell_size, j as f64 * self.cell_size)
    }

    /// Nearest cell to a world position, `None` outside the grid
    pub fn world_to_cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let i = (x / self.cell_size).round();
        let j = (y / self.cell_size).round();
        if i.is_nan() || j.is_nan() || i < 0.0 || j < 0.0 {
            return None;
        }
        let (i, j) = (i as usize, j as usize);
        (i < self.rows() && j < self.cols()).then_some((i, j))
    }

    /// World position of the grid center
    pub fn center(&self) -> Point2D {
        Point2D::new(
            0.5 * self.rows() as f64 * self.cell_size,
            0.5 * self.cols() as f64 * self.cell_size,
        )
    }

    /// Largest absolute cell value
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// Write every cell as a `row col value` record
    ///
    /// Values use Rust's shortest round-trip formatting, so
    /// [`Grid::read_records`] restores them bit for bit.
    pub fn write_records<W: Write>(&self, mut writer: W) -> Result<()> {
        self.write_records_with(&mut writer, |_, _, v| Some(v))
    }

    /// Write records after mapping each value; `None` skips the cell
    pub(crate) fn write_records_with<W, F>(&self, writer: &mut W, map: F) -> Result<()>
    where
        W: Write,
        F: Fn(usize, usize, f64) -> Option<f64>,
    {
        for (i, row) in self.values.outer_iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if let Some(out) = map(i, j, v) {
                    writeln!(writer, "{} {} {}", i, j, out)?;
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Overwrite this grid from `row col value` records
    ///
    /// Every cell must appear exactly once; blank lines are ignored. The
    /// grid is only modified when the whole stream parses.
    pub fn read_records<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let mut values = Array2::<f64>::zeros(self.dim());
        let mut seen = Array2::<bool>::from_elem(self.dim(), false);
        let mut count = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record_error = |message: String| SurfaceError::Record {
                line: line_no,
                message,
            };

            let mut fields = trimmed.split_whitespace();
            let (Some(i), Some(j), Some(v), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(record_error(format!(
                    "expected 'row col value', got '{}'",
                    trimmed
                )));
            };
            let i: usize = i
                .parse()
                .map_err(|e| record_error(format!("bad row index '{}': {}", i, e)))?;
            let j: usize = j
                .parse()
                .map_err(|e| record_error(format!("bad column index '{}': {}", j, e)))?;
            let v: f64 = v
                .parse()
                .map_err(|e| record_error(format!("bad value '{}': {}", v, e)))?;

            match seen.get_mut((i, j)) {
                None => {
                    return Err(record_error(format!(
                        "cell ({}, {}) outside {}x{} grid",
                        i,
                        j,
                        self.rows(),
                        self.cols()
                    )));
                }
                Some(flag) if *flag => {
                    return Err(record_error(format!("duplicate cell ({}, {})", i, j)));
                }
                Some(flag) => *flag = true,
            }
            values[[i, j]] = v;
            count += 1;
        }

        if count != values.len() {
            return Err(SurfaceError::Record {
                line: 0,
                message: format!("expected {} cells, found {}", values.len(), count),
            });
        }

        self.values = values;
        Ok(())
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.values[[i, j]]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.values[[i, j]]
    }
}

impl AddAssign<&Grid> for Grid {
    /// Cellwise accumulation; both grids must share a shape.
    fn add_assign(&mut self, rhs: &Grid) {
        self.values += &rhs.values;
    }
}
