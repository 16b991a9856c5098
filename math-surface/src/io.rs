//! Text exports of the surface state
//!
//! Everything is written in the `row col value` record layout of
//! [`Grid::write_records`], ready for gnuplot's `splot ... with pm3d`.
//! Only the rendered grid can be read back.

use crate::error::{Result, SurfaceError};
use crate::grid::Grid;
use crate::surface::WaterSurface;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Reference amplitude of the dB exports (1 mm)
pub const REFERENCE_AMPLITUDE: f64 = 1e-3;

/// Fraction of the amplitude scale the height dump is clamped to
pub const HEIGHT_DUMP_BOUND: f64 = 0.25;

/// Which view of a band cache to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmplitudeView {
    /// `20·log10(|A| / 1 mm)`
    Decibels,
    /// `arg(A)` in radians
    Phase,
    /// `Re(A)`
    Real,
    /// `Im(A)`
    Imaginary,
}

impl AmplitudeView {
    fn apply(self, re: f64, im: f64) -> f64 {
        match self {
            AmplitudeView::Decibels => 20.0 * (re.hypot(im) / REFERENCE_AMPLITUDE).log10(),
            AmplitudeView::Phase => im.atan2(re),
            AmplitudeView::Real => re,
            AmplitudeView::Imaginary => im,
        }
    }
}

fn create<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    log::info!("Exporting {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}

impl WaterSurface {
    /// Write the rendered grid as records
    pub fn write_height<W: Write>(&self, writer: W) -> Result<()> {
        self.rendered().write_records(writer)
    }

    /// Save the rendered grid to a file
    pub fn export_height<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut out = create(path)?;
        self.write_height(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Replace the rendered grid with one read from a file
    ///
    /// The file must hold exactly one record per cell of the current grid.
    /// A surface in the `Rendered` phase drops back to `Cached`.
    pub fn import_height<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::info!("Importing {}", path.display());
        let mut grid = Grid::new(self.rows(), self.cols(), self.cell_size())?;
        grid.read_records(BufReader::new(File::open(path)?))?;
        self.replace_rendered(grid);
        Ok(())
    }

    /// Write one view of band `band`'s cached amplitude
    pub fn write_amplitude<W: Write>(
        &self,
        band: usize,
        view: AmplitudeView,
        mut writer: W,
    ) -> Result<()> {
        let (re, im) = self
            .amplitude_grids(band)
            .ok_or(SurfaceError::UnknownBand(band))?;
        re.write_records_with(&mut writer, |i, j, r| Some(view.apply(r, im[(i, j)])))
    }

    /// Save one view of band `band`'s cached amplitude to a file
    pub fn export_amplitude<P: AsRef<Path>>(
        &self,
        band: usize,
        view: AmplitudeView,
        path: P,
    ) -> Result<()> {
        let mut out = create(path)?;
        self.write_amplitude(band, view, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Amplitude of band `band` in dB re 1 mm
    pub fn export_amplitude_db<P: AsRef<Path>>(&self, band: usize, path: P) -> Result<()> {
        self.export_amplitude(band, AmplitudeView::Decibels, path)
    }

    /// Phase of band `band`
    pub fn export_phase<P: AsRef<Path>>(&self, band: usize, path: P) -> Result<()> {
        self.export_amplitude(band, AmplitudeView::Phase, path)
    }

    /// Real part of band `band`
    pub fn export_real<P: AsRef<Path>>(&self, band: usize, path: P) -> Result<()> {
        self.export_amplitude(band, AmplitudeView::Real, path)
    }

    /// Imaginary part of band `band`
    pub fn export_imag<P: AsRef<Path>>(&self, band: usize, path: P) -> Result<()> {
        self.export_amplitude(band, AmplitudeView::Imaginary, path)
    }

    /// Write the rendered grid clamped to ±¼ of the amplitude scale
    ///
    /// A leading `0 0 bound` record pins the plot's color range; the first
    /// row and column are left out.
    pub fn write_clamped_height<W: Write>(&self, mut writer: W) -> Result<()> {
        let bound = HEIGHT_DUMP_BOUND * self.amplitude_scale();
        writeln!(writer, "0 0 {}", bound)?;
        self.rendered().write_records_with(&mut writer, |i, j, v| {
            (i != 0 && j != 0).then(|| v.clamp(-bound, bound))
        })
    }

    /// Save the clamped height dump to a file
    pub fn export_clamped_height<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut out = create(path)?;
        self.write_clamped_height(&mut out)?;
        out.flush()?;
        Ok(())
    }
}
