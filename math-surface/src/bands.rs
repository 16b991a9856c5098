//! Wavelength band sequence
//!
//! Sources are grouped by wavelength: every band has one wave number and
//! one angular frequency, so its cached complex amplitude evolves in time
//! by a single phase rotation.

use crate::error::{Result, SurfaceError};
use math_water_wave::PhysicalParameters;
use math_water_wave::special::wave_number;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Upper bound on the number of bands a sequence may expand to
pub const MAX_BANDS: usize = 4096;

/// How the wavelengths between `min` and `max` are generated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BandSpacing {
    /// Start at `min` and multiply by the ratio while below `max`; the
    /// last band may overshoot `max`.
    Ratio(f64),
    /// `n` geometrically spaced bands from `min` to `max` inclusive.
    Count(usize),
}

impl Default for BandSpacing {
    fn default() -> Self {
        BandSpacing::Ratio(1.2)
    }
}

/// One wavelength band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Wavelength λ
    pub wavelength: f64,
    /// Wave number k = 2π/λ
    pub wave_number: f64,
    /// Angular frequency ω(k)
    pub angular_frequency: f64,
}

impl Band {
    fn new(wavelength: f64, params: &PhysicalParameters) -> Self {
        let k = wave_number(wavelength);
        Self {
            wavelength,
            wave_number: k,
            angular_frequency: params.dispersion(k),
        }
    }

    /// Time after which the band's phase rotation repeats, 2π/ω
    pub fn period(&self) -> f64 {
        2.0 * PI / self.angular_frequency
    }

    /// Phase rotation `exp(−iωt)` applied to the band's cached amplitude
    #[inline]
    pub fn phase_rotation(&self, time: f64) -> Complex64 {
        Complex64::from_polar(1.0, -self.angular_frequency * time)
    }
}

/// Strictly increasing sequence of wavelength bands
#[derive(Debug, Clone, PartialEq)]
pub struct BandSequence {
    bands: Vec<Band>,
}

impl BandSequence {
    /// Build the band sequence for `[min, max]`
    ///
    /// # Errors
    /// [`SurfaceError::InvalidBands`] when the bounds are not positive and
    /// ordered, the ratio is not above one, the count is zero, or the
    /// sequence would not be strictly increasing.
    pub fn new(
        min: f64,
        max: f64,
        spacing: BandSpacing,
        params: &PhysicalParameters,
    ) -> Result<Self> {
        let invalid = |reason| SurfaceError::InvalidBands { min, max, reason };

        if !min.is_finite() || !max.is_finite() || min <= 0.0 {
            return Err(invalid("bounds must be finite and min > 0"));
        }
        if max < min {
            return Err(invalid("max < min"));
        }

        let wavelengths = match spacing {
            BandSpacing::Ratio(ratio) => {
                if !ratio.is_finite() || ratio <= 1.0 {
                    return Err(invalid("ratio must be finite and > 1"));
                }
                let mut wavelengths = vec![min];
                let mut wl = min;
                while wl < max {
                    wl *= ratio;
                    wavelengths.push(wl);
                    if wavelengths.len() > MAX_BANDS {
                        return Err(invalid("too many bands"));
                    }
                }
                wavelengths
            }
            BandSpacing::Count(0) => return Err(invalid("band count must be > 0")),
            BandSpacing::Count(1) => vec![min],
            BandSpacing::Count(n) => {
                if n > MAX_BANDS {
                    return Err(invalid("too many bands"));
                }
                if max == min {
                    return Err(invalid("several bands need max > min"));
                }
                let ratio = (max / min).powf(1.0 / (n - 1) as f64);
                let mut wavelengths: Vec<f64> =
                    (0..n - 1).map(|i| min * ratio.powi(i as i32)).collect();
                wavelengths.push(max);
                wavelengths
            }
        };

        if wavelengths.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("wavelengths are not strictly increasing"));
        }

        Ok(Self {
            bands: wavelengths.into_iter().map(|wl| Band::new(wl, params)).collect(),
        })
    }

    /// Same wavelengths with frequencies derived from other parameters
    pub fn with_parameters(&self, params: &PhysicalParameters) -> Self {
        Self {
            bands: self
                .bands
                .iter()
                .map(|b| Band::new(b.wavelength, params))
                .collect(),
        }
    }

    /// Sequence with a single band
    pub fn single(wavelength: f64, params: &PhysicalParameters) -> Result<Self> {
        Self::new(wavelength, wavelength, BandSpacing::Count(1), params)
    }

    /// Number of bands
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Always false for a constructed sequence
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band `b`
    pub fn get(&self, b: usize) -> Option<&Band> {
        self.bands.get(b)
    }

    /// All bands, finest first
    pub fn iter(&self) -> std::slice::Iter<'_, Band> {
        self.bands.iter()
    }

    /// Wavelengths, finest first
    pub fn wavelengths(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.wavelength).collect()
    }

    /// Finest wavelength
    pub fn min_wavelength(&self) -> f64 {
        self.bands[0].wavelength
    }

    /// Coarsest wavelength
    pub fn max_wavelength(&self) -> f64 {
        self.bands[self.bands.len() - 1].wavelength
    }

    /// Number of leading bands with wavelength ≤ `wavelength`
    ///
    /// These are the bands a source requested at `wavelength` fans out to.
    pub fn count_up_to(&self, wavelength: f64) -> usize {
        self.bands.partition_point(|b| b.wavelength <= wavelength)
    }
}

impl<'a> IntoIterator for &'a BandSequence {
    type Item = &'a Band;
    type IntoIter = std::slice::Iter<'a, Band>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}
