//! JSON configuration for water surface simulations

use crate::bands::{BandSequence, BandSpacing};
use crate::error::{Result, SurfaceError};
use crate::grid::Grid;
use math_water_wave::{PhysicalParameters, WaveError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete surface configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceConfig {
    /// Grid resolution
    #[serde(default)]
    pub grid: GridConfig,
    /// Physical constants
    #[serde(default)]
    pub physics: PhysicalParameters,
    /// Wavelength bands
    #[serde(default)]
    pub bands: BandConfig,
    /// Time stepping
    #[serde(default)]
    pub time: TimeConfig,
    /// Amplitude scale: default source amplitude and height dump bound
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Sources added when the surface is built
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_amplitude() -> f64 {
    1.0
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            physics: PhysicalParameters::default(),
            bands: BandConfig::default(),
            time: TimeConfig::default(),
            amplitude: default_amplitude(),
            sources: Vec::new(),
        }
    }
}

/// Grid configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GridConfig {
    /// Rows (x direction)
    pub rows: usize,
    /// Columns (y direction)
    pub cols: usize,
    /// World size of one cell (m)
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 150,
            cols: 150,
            cell_size: 0.2,
        }
    }
}

/// Wavelength band configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandConfig {
    /// Finest wavelength (m)
    pub min: f64,
    /// Coarsest wavelength (m)
    pub max: f64,
    /// Band generation rule
    #[serde(default)]
    pub spacing: BandSpacing,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            spacing: BandSpacing::default(),
        }
    }
}

impl BandConfig {
    /// Build the band sequence
    pub fn to_sequence(&self, params: &PhysicalParameters) -> Result<BandSequence> {
        BandSequence::new(self.min, self.max, self.spacing, params)
    }
}

/// Time stepping configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeConfig {
    /// Time step (s)
    pub dt: f64,
    /// Last step before `update` reports that the run is over
    pub stop_step: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            dt: 0.03,
            stop_step: 10_000,
        }
    }
}

/// One configured source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// X position (m)
    pub x: f64,
    /// Y position (m)
    pub y: f64,
    /// Requested wavelength; `None` selects the coarsest band
    #[serde(default)]
    pub wavelength: Option<f64>,
    /// Real amplitude; `None` uses the configured amplitude scale
    #[serde(default)]
    pub amplitude: Option<f64>,
    /// Imaginary part of the amplitude
    #[serde(default)]
    pub amplitude_im: f64,
    /// Emit in every band regardless of wavelength
    #[serde(default)]
    pub all_bands: bool,
}

impl SourceConfig {
    /// Complex amplitude, falling back to `scale` for the real part
    pub fn complex_amplitude(&self, scale: f64) -> Complex64 {
        Complex64::new(self.amplitude.unwrap_or(scale), self.amplitude_im)
    }
}

impl SurfaceConfig {
    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SurfaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject configurations no surface can be built from
    pub fn validate(&self) -> Result<()> {
        Grid::validate_shape(self.grid.rows, self.grid.cols, self.grid.cell_size)?;
        self.physics.validate()?;
        self.bands.to_sequence(&self.physics)?;
        if !self.time.dt.is_finite() || self.time.dt <= 0.0 {
            return Err(SurfaceError::InvalidTimeStep { dt: self.time.dt });
        }
        let bad_wavelength = self
            .sources
            .iter()
            .filter_map(|s| s.wavelength)
            .find(|wl| !wl.is_finite() || *wl < 0.0);
        if let Some(wavelength) = bad_wavelength {
            return Err(WaveError::InvalidWavelength { wavelength }.into());
        }
        Ok(())
    }

    /// Single-band configuration on a `rows × cols` grid
    pub fn single_band(rows: usize, cols: usize, cell_size: f64, wavelength: f64) -> Self {
        Self {
            grid: GridConfig {
                rows,
                cols,
                cell_size,
            },
            bands: BandConfig {
                min: wavelength,
                max: wavelength,
                spacing: BandSpacing::Count(1),
            },
            ..Self::default()
        }
    }
}
