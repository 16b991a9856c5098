//! Multi-band water surface
//!
//! [`WaterSurface`] owns one source list per wavelength band and, for each
//! band, the real and imaginary parts of the summed static complex
//! amplitude over the grid. Time evolution never re-evaluates a source:
//! each band cache is rotated by `exp(−iω_b·t)` and the real parts are
//! summed into the rendered height grid.
//!
//! # Phases
//!
//! - [`SurfacePhase::Configuring`]: the source set or bands changed, caches are stale
//! - [`SurfacePhase::Cached`]: band caches match the source set
//! - [`SurfacePhase::Rendered`]: the rendered grid was built from the caches
//!
//! Caches and the rendered grid are rebuilt into fresh buffers and swapped
//! in whole. The rendered grid is published as an `Arc<Grid>`, so a reader
//! holding a snapshot never sees a half-computed field.
//!
//! # Example
//!
//! ```
//! use math_water_surface::{StepStatus, SurfaceConfig, WaterSurface};
//! use num_complex::Complex64;
//!
//! let config = SurfaceConfig::single_band(40, 40, 0.25, 1.0);
//! let mut surface = WaterSurface::new(&config).unwrap();
//! surface.add_eq_source(5.0, 5.0, 0.0, Complex64::new(1.0, 0.0)).unwrap();
//! surface.compute_amplitudes().unwrap();
//! assert_eq!(surface.update().unwrap(), StepStatus::Continue);
//! let h = surface.height(10, 12);
//! assert!(h.is_finite());
//! ```

use crate::bands::{BandSequence, BandSpacing};
use crate::config::SurfaceConfig;
use crate::constraint::ConstraintPoint;
use crate::error::{Result, SurfaceError};
use crate::grid::Grid;
use math_water_solvers::parallel::{parallel_map_indexed, worker_count};
use math_water_wave::{EquivalentSource, PhysicalParameters, Point2D, WaveError};
use ndarray::Array2;
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Handle of a logical source, shared by all its band instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Raw id value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source as requested by the caller, before fan-out into bands
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSource {
    /// Handle returned when the source was added
    pub id: SourceId,
    /// World position
    pub position: Point2D,
    /// Requested wavelength; `None` selects the coarsest band
    pub wavelength: Option<f64>,
    /// Complex amplitude shared by every band instance
    pub amplitude: Complex64,
    /// Emit in every band regardless of wavelength
    pub all_bands: bool,
}

/// One band-specific instance of a placed source
#[derive(Debug, Clone)]
pub struct SourceInstance {
    owner: SourceId,
    source: EquivalentSource,
}

impl SourceInstance {
    /// Logical source this instance belongs to
    pub fn owner(&self) -> SourceId {
        self.owner
    }

    /// The band-specific source
    pub fn source(&self) -> &EquivalentSource {
        &self.source
    }
}

/// Cache state of a [`WaterSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    /// Sources or bands changed since the last amplitude computation
    Configuring,
    /// Band caches are current
    Cached,
    /// Band caches are current and the rendered grid was built from them
    Rendered,
}

/// Outcome of one [`WaterSurface::update`] step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The configured stop step has not been passed
    Continue,
    /// The step counter went past the configured stop step
    StopReached,
}

/// Time-harmonic water surface synthesized from equivalent sources
#[derive(Debug, Clone)]
pub struct WaterSurface {
    config: SurfaceConfig,
    params: PhysicalParameters,
    rows: usize,
    cols: usize,
    cell_size: f64,
    bands: BandSequence,
    placed: Vec<PlacedSource>,
    instances: Vec<Vec<SourceInstance>>,
    next_id: u64,
    constraints: Vec<ConstraintPoint>,
    ampli_re: Vec<Grid>,
    ampli_im: Vec<Grid>,
    rendered: Arc<Grid>,
    rendered_time: f64,
    step: u64,
    dt: f64,
    stop_step: u64,
    phase: SurfacePhase,
}

impl WaterSurface {
    /// Empty surface for a configuration; configured sources are ignored
    ///
    /// # Errors
    /// Any configuration error reported by [`SurfaceConfig::validate`].
    pub fn new(config: &SurfaceConfig) -> Result<Self> {
        config.validate()?;
        let params = config.physics;
        let bands = config.bands.to_sequence(&params)?;
        let (rows, cols, cell_size) = (config.grid.rows, config.grid.cols, config.grid.cell_size);
        let (ampli_re, ampli_im) = zero_caches(bands.len(), rows, cols, cell_size)?;

        log::info!(
            "Water surface {}x{} (cell {} m), {} bands in [{}, {}] m",
            rows,
            cols,
            cell_size,
            bands.len(),
            bands.min_wavelength(),
            bands.max_wavelength()
        );

        Ok(Self {
            config: config.clone(),
            params,
            rows,
            cols,
            cell_size,
            instances: vec![Vec::new(); bands.len()],
            bands,
            placed: Vec::new(),
            next_id: 0,
            constraints: Vec::new(),
            ampli_re,
            ampli_im,
            rendered: Arc::new(Grid::new(rows, cols, cell_size)?),
            rendered_time: 0.0,
            step: 0,
            dt: config.time.dt,
            stop_step: config.time.stop_step,
            phase: SurfacePhase::Configuring,
        })
    }

    /// Surface with every source listed in the configuration
    pub fn from_config(config: &SurfaceConfig) -> Result<Self> {
        let mut surface = Self::new(config)?;
        for source in &config.sources {
            let amplitude = source.complex_amplitude(config.amplitude);
            if source.all_bands {
                surface.add_source_all_bands(source.x, source.y, amplitude)?;
            } else {
                surface.add_eq_source(
                    source.x,
                    source.y,
                    source.wavelength.unwrap_or(0.0),
                    amplitude,
                )?;
            }
        }
        Ok(surface)
    }

    /// Load a JSON configuration file and build the surface from it
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::from_config(&SurfaceConfig::from_file(path)?)
    }

    /// Return to the configured state
    ///
    /// Sources and constraints are dropped, the bands and caches rebuilt,
    /// the configured sources re-added and the clock zeroed. Changes made
    /// through the grid, physics, band and stop-step setters are part of
    /// the configuration and survive.
    pub fn reset(&mut self) -> Result<()> {
        *self = Self::from_config(&self.config)?;
        Ok(())
    }

    /// Replace the band sequence and re-instantiate every source in it
    ///
    /// On error the surface is left unchanged.
    pub fn set_band_sequence(&mut self, min: f64, max: f64, spacing: BandSpacing) -> Result<()> {
        let bands = BandSequence::new(min, max, spacing, &self.params)?;
        self.install_bands(bands)?;
        self.config.bands.min = min;
        self.config.bands.max = max;
        self.config.bands.spacing = spacing;
        log::info!(
            "Band sequence: {} bands in [{}, {}] m",
            self.bands.len(),
            self.min_wavelength(),
            self.max_wavelength()
        );
        Ok(())
    }

    /// Change the grid resolution; all caches are re-derived
    pub fn set_grid(&mut self, rows: usize, cols: usize, cell_size: f64) -> Result<()> {
        let (ampli_re, ampli_im) = zero_caches(self.bands.len(), rows, cols, cell_size)?;
        self.rendered = Arc::new(Grid::new(rows, cols, cell_size)?);
        self.rows = rows;
        self.cols = cols;
        self.cell_size = cell_size;
        self.ampli_re = ampli_re;
        self.ampli_im = ampli_im;
        self.phase = SurfacePhase::Configuring;
        self.config.grid.rows = rows;
        self.config.grid.cols = cols;
        self.config.grid.cell_size = cell_size;
        Ok(())
    }

    /// Change the physical constants; band frequencies and sources follow
    pub fn set_physics(&mut self, params: PhysicalParameters) -> Result<()> {
        params.validate()?;
        let bands = self.bands.with_parameters(&params);
        let instances = build_instances(&bands, &params, &self.placed)?;
        self.params = params;
        self.bands = bands;
        self.instances = instances;
        self.phase = SurfacePhase::Configuring;
        self.config.physics = params;
        Ok(())
    }

    fn install_bands(&mut self, bands: BandSequence) -> Result<()> {
        let instances = build_instances(&bands, &self.params, &self.placed)?;
        let (ampli_re, ampli_im) =
            zero_caches(bands.len(), self.rows, self.cols, self.cell_size)?;
        self.bands = bands;
        self.instances = instances;
        self.ampli_re = ampli_re;
        self.ampli_im = ampli_im;
        self.phase = SurfacePhase::Configuring;
        Ok(())
    }

    /// Add a source at `(x, y)`
    ///
    /// One instance is created in every band whose wavelength is at most
    /// `wavelength`; `0.0` selects the coarsest band, so the source then
    /// emits in all of them.
    ///
    /// # Errors
    /// [`WaveError::InvalidWavelength`] for a negative or non-finite wavelength.
    pub fn add_eq_source(
        &mut self,
        x: f64,
        y: f64,
        wavelength: f64,
        amplitude: Complex64,
    ) -> Result<SourceId> {
        if !wavelength.is_finite() || wavelength < 0.0 {
            return Err(WaveError::InvalidWavelength { wavelength }.into());
        }
        let requested = (wavelength != 0.0).then_some(wavelength);
        self.insert(Point2D::new(x, y), requested, amplitude, false)
    }

    /// Add a source emitting in every band
    pub fn add_source_all_bands(
        &mut self,
        x: f64,
        y: f64,
        amplitude: Complex64,
    ) -> Result<SourceId> {
        self.insert(Point2D::new(x, y), None, amplitude, true)
    }

    fn insert(
        &mut self,
        position: Point2D,
        wavelength: Option<f64>,
        amplitude: Complex64,
        all_bands: bool,
    ) -> Result<SourceId> {
        let id = SourceId(self.next_id);
        let placed = PlacedSource {
            id,
            position,
            wavelength,
            amplitude,
            all_bands,
        };
        let per_band = instantiate(&self.bands, &self.params, &placed)?;
        if per_band.is_empty() {
            log::warn!(
                "Source {} at ({}, {}) requests wavelength {:?} below the finest band {}; it emits nothing",
                id,
                position.x,
                position.y,
                wavelength,
                self.min_wavelength()
            );
        } else {
            log::debug!(
                "Source {} at ({}, {}) placed in {} band(s)",
                id,
                position.x,
                position.y,
                per_band.len()
            );
        }

        for (list, instance) in self.instances.iter_mut().zip(per_band) {
            list.push(instance);
        }
        self.next_id += 1;
        self.placed.push(placed);
        self.phase = SurfacePhase::Configuring;
        Ok(id)
    }

    /// Remove a source and all its band instances
    pub fn remove_source(&mut self, id: SourceId) -> Result<()> {
        let index = self
            .placed
            .iter()
            .position(|p| p.id == id)
            .ok_or(SurfaceError::UnknownSource(id.value()))?;
        self.placed.remove(index);
        for list in &mut self.instances {
            list.retain(|instance| instance.owner != id);
        }
        self.phase = SurfacePhase::Configuring;
        Ok(())
    }

    /// Remove every source from every band
    pub fn clear(&mut self) {
        self.placed.clear();
        for list in &mut self.instances {
            list.clear();
        }
        self.phase = SurfacePhase::Configuring;
    }

    /// Record a height constraint
    pub fn add_constraint(&mut self, x: f64, y: f64, height: f64) {
        self.constraints.push(ConstraintPoint::new(x, y, height));
    }

    /// Drop every height constraint
    pub fn clear_constraints(&mut self) {
        self.constraints.clear();
    }

    /// Recorded height constraints
    pub fn constraints(&self) -> &[ConstraintPoint] {
        &self.constraints
    }

    /// Recompute every band cache
    pub fn compute_amplitudes(&mut self) -> Result<()> {
        self.compute_amplitudes_cancellable(&AtomicBool::new(false))
    }

    /// Recompute every band cache, checking `cancel` before each band
    ///
    /// # Errors
    /// [`SurfaceError::Cancelled`] if the flag is raised; the previous
    /// caches are kept untouched in that case.
    pub fn compute_amplitudes_cancellable(&mut self, cancel: &AtomicBool) -> Result<()> {
        let start = Instant::now();
        let mut ampli_re = Vec::with_capacity(self.bands.len());
        let mut ampli_im = Vec::with_capacity(self.bands.len());

        for (b, sources) in self.instances.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                log::warn!(
                    "Amplitude computation cancelled after {} of {} bands",
                    b,
                    self.bands.len()
                );
                return Err(SurfaceError::Cancelled);
            }
            let (re, im) = self.band_amplitude(sources)?;
            ampli_re.push(re);
            ampli_im.push(im);
        }

        self.ampli_re = ampli_re;
        self.ampli_im = ampli_im;
        self.phase = SurfacePhase::Cached;

        log::info!(
            "Amplitude caches: {} bands, {} instances, {}x{} grid in {:.1}ms ({} workers)",
            self.bands.len(),
            self.instance_count(),
            self.rows,
            self.cols,
            start.elapsed().as_secs_f64() * 1000.0,
            worker_count()
        );
        Ok(())
    }

    /// Summed static complex amplitude of one band, split into re/im grids
    ///
    /// Rows are independent tasks; each cell sums its sources in list
    /// order, so the result does not depend on the thread count.
    fn band_amplitude(&self, sources: &[SourceInstance]) -> Result<(Grid, Grid)> {
        let (cols, h) = (self.cols, self.cell_size);
        let rows: Vec<Vec<Complex64>> = parallel_map_indexed(self.rows, |i| {
            let x = i as f64 * h;
            (0..cols)
                .map(|j| {
                    let y = j as f64 * h;
                    sources
                        .iter()
                        .map(|s| s.source.heightc_static(x, y))
                        .sum::<Complex64>()
                })
                .collect()
        });

        let shape = (self.rows, self.cols);
        let re = Array2::from_shape_fn(shape, |(i, j)| rows[i][j].re);
        let im = Array2::from_shape_fn(shape, |(i, j)| rows[i][j].im);
        Ok((Grid::from_array(re, h)?, Grid::from_array(im, h)?))
    }

    /// Render the height field at `time` from the band caches
    ///
    /// Stale caches are recomputed first.
    pub fn render(&mut self, time: f64) -> Result<()> {
        if self.phase == SurfacePhase::Configuring {
            self.compute_amplitudes()?;
        }

        let rotations: Vec<Complex64> =
            self.bands.iter().map(|b| b.phase_rotation(time)).collect();
        let (re, im) = (&self.ampli_re, &self.ampli_im);
        let cols = self.cols;
        let rows: Vec<Vec<f64>> = parallel_map_indexed(self.rows, |i| {
            (0..cols)
                .map(|j| {
                    rotations
                        .iter()
                        .enumerate()
                        .map(|(b, rot)| (Complex64::new(re[b][(i, j)], im[b][(i, j)]) * rot).re)
                        .sum::<f64>()
                })
                .collect()
        });

        let values = Array2::from_shape_fn((self.rows, self.cols), |(i, j)| rows[i][j]);
        self.rendered = Arc::new(Grid::from_array(values, self.cell_size)?);
        self.rendered_time = time;
        self.phase = SurfacePhase::Rendered;
        Ok(())
    }

    /// Render at the current simulation time
    pub fn update_height(&mut self) -> Result<()> {
        self.render(self.time())
    }

    /// Render at the current time, then advance the clock by one step
    ///
    /// Returns [`StepStatus::StopReached`] once the step counter passes the
    /// configured stop step; the caller decides what that means.
    pub fn update(&mut self) -> Result<StepStatus> {
        log::trace!("Step {} (t = {})", self.step, self.time());
        self.update_height()?;
        self.step += 1;
        if self.step > self.stop_step {
            log::info!("Stop step {} reached", self.stop_step);
            Ok(StepStatus::StopReached)
        } else {
            Ok(StepStatus::Continue)
        }
    }

    /// Recompute the band caches and render at `time`
    pub fn recompute(&mut self, time: f64) -> Result<()> {
        self.compute_amplitudes()?;
        self.render(time)
    }

    /// Rendered height at cell `(i, j)`
    ///
    /// # Panics
    /// If `(i, j)` is outside the grid.
    pub fn height(&self, i: usize, j: usize) -> f64 {
        self.rendered[(i, j)]
    }

    /// Rendered height at cell `(i, j)`, `None` outside the grid
    pub fn get_height(&self, i: usize, j: usize) -> Option<f64> {
        self.rendered.get(i, j)
    }

    /// Rendered height at the cell nearest to a world position
    pub fn sampled_height(&self, x: f64, y: f64) -> Option<f64> {
        let (i, j) = self.rendered.world_to_cell(x, y)?;
        self.rendered.get(i, j)
    }

    /// Complex field at a world position and time, evaluated from the sources
    ///
    /// Each band's static sum is rotated by the band's phase; the real part
    /// is the height the rendered grid would show at a node.
    pub fn complex_height_at_world(&self, x: f64, y: f64, time: f64) -> Complex64 {
        self.bands
            .iter()
            .zip(&self.instances)
            .map(|(band, sources)| {
                let sum: Complex64 = sources.iter().map(|s| s.source.heightc_static(x, y)).sum();
                sum * band.phase_rotation(time)
            })
            .sum()
    }

    /// Height at a world position and time, evaluated from the sources
    pub fn height_at_world(&self, x: f64, y: f64, time: f64) -> f64 {
        self.complex_height_at_world(x, y, time).re
    }

    /// Complex field that a unit-amplitude source at `position` would add
    /// at `point` and `time`, over every band it would be placed in
    ///
    /// `wavelength` follows [`WaterSurface::add_eq_source`]: `0.0` selects
    /// the coarsest band.
    pub fn transfer_coefficient(
        &self,
        position: Point2D,
        wavelength: f64,
        point: Point2D,
        time: f64,
    ) -> Result<Complex64> {
        let unit = PlacedSource {
            id: SourceId(u64::MAX),
            position,
            wavelength: (wavelength != 0.0).then_some(wavelength),
            amplitude: Complex64::new(1.0, 0.0),
            all_bands: false,
        };
        let per_band = instantiate(&self.bands, &self.params, &unit)?;
        Ok(per_band
            .iter()
            .zip(self.bands.iter())
            .map(|(instance, band)| {
                instance.source.heightc_static(point.x, point.y) * band.phase_rotation(time)
            })
            .sum())
    }

    /// Publish an externally produced grid as the rendered field
    /// Install a rendered grid that did not come from the caches
    ///
    /// The grid no longer reflects a render of the caches, so the phase
    /// drops back to `Cached` when they are valid.
    pub(crate) fn replace_rendered(&mut self, grid: Grid) {
        self.rendered = Arc::new(grid);
        if self.phase == SurfacePhase::Rendered {
            self.phase = SurfacePhase::Cached;
        }
    }

    /// Latest rendered grid snapshot
    pub fn rendered(&self) -> Arc<Grid> {
        Arc::clone(&self.rendered)
    }

    /// Time the rendered grid was computed for
    pub fn rendered_time(&self) -> f64 {
        self.rendered_time
    }

    /// Current simulation time, `step · dt`
    pub fn time(&self) -> f64 {
        self.step as f64 * self.dt
    }

    /// Current step counter
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Time step
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Step after which [`WaterSurface::update`] reports `StopReached`
    pub fn stop_step(&self) -> u64 {
        self.stop_step
    }

    /// Change the stop step
    pub fn set_stop_step(&mut self, stop_step: u64) {
        self.stop_step = stop_step;
        self.config.time.stop_step = stop_step;
    }

    /// Cache state
    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Band sequence in use
    pub fn bands(&self) -> &BandSequence {
        &self.bands
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Finest wavelength
    pub fn min_wavelength(&self) -> f64 {
        self.bands.min_wavelength()
    }

    /// Coarsest wavelength
    pub fn max_wavelength(&self) -> f64 {
        self.bands.max_wavelength()
    }

    /// Source instances of band `b`
    pub fn band_sources(&self, b: usize) -> Option<&[SourceInstance]> {
        self.instances.get(b).map(Vec::as_slice)
    }

    /// Number of source instances in band `b`, zero for an unknown band
    pub fn band_source_count(&self, b: usize) -> usize {
        self.instances.get(b).map_or(0, Vec::len)
    }

    /// Total number of band instances
    pub fn instance_count(&self) -> usize {
        self.instances.iter().map(Vec::len).sum()
    }

    /// Placed sources, in insertion order
    pub fn sources(&self) -> &[PlacedSource] {
        &self.placed
    }

    /// Number of placed sources
    pub fn source_count(&self) -> usize {
        self.placed.len()
    }

    /// Positions of the placed sources
    pub fn source_positions(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.placed.iter().map(|p| p.position)
    }

    /// Real and imaginary cache grids of band `b`
    pub fn amplitude_grids(&self, b: usize) -> Option<(&Grid, &Grid)> {
        Some((self.ampli_re.get(b)?, self.ampli_im.get(b)?))
    }

    /// Physical constants in use
    pub fn parameters(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Configuration the surface resets to
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Amplitude scale of the configuration
    pub fn amplitude_scale(&self) -> f64 {
        self.config.amplitude
    }

    /// Grid rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Grid cell size
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World position of the grid center
    pub fn center(&self) -> Point2D {
        self.rendered.center()
    }
}

fn zero_caches(
    bands: usize,
    rows: usize,
    cols: usize,
    cell_size: f64,
) -> Result<(Vec<Grid>, Vec<Grid>)> {
    let zero = Grid::new(rows, cols, cell_size)?;
    Ok((vec![zero.clone(); bands], vec![zero; bands]))
}

/// Band instances of one placed source, finest band first
fn instantiate(
    bands: &BandSequence,
    params: &PhysicalParameters,
    placed: &PlacedSource,
) -> Result<Vec<SourceInstance>> {
    let count = match placed.wavelength {
        Some(wl) if !placed.all_bands => bands.count_up_to(wl),
        _ => bands.len(),
    };
    bands
        .iter()
        .take(count)
        .map(|band| -> Result<SourceInstance> {
            let source = EquivalentSource::at(
                band.wavelength,
                *params,
                placed.position.x,
                placed.position.y,
                placed.amplitude,
            )?;
            Ok(SourceInstance {
                owner: placed.id,
                source,
            })
        })
        .collect()
}

fn build_instances(
    bands: &BandSequence,
    params: &PhysicalParameters,
    placed: &[PlacedSource],
) -> Result<Vec<Vec<SourceInstance>>> {
    let mut instances = vec![Vec::new(); bands.len()];
    for source in placed {
        for (list, instance) in instances.iter_mut().zip(instantiate(bands, params, source)?) {
            list.push(instance);
        }
    }
    Ok(instances)
}
