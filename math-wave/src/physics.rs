//! Physical constants of the simulated surface
//!
//! Held in an immutable [`PhysicalParameters`] value that every source
//! carries, so independent simulations never share hidden state.

use crate::error::{Result, WaveError};
use crate::special;
use serde::{Deserialize, Serialize};

/// Damping value at or below which a source contribution is dropped.
///
/// One gate for both the near field, where the asymptotic Hankel form is
/// invalid, and the far field, where the contribution is negligible.
pub const VALIDITY_CUTOFF: f64 = 0.02;

/// Standard gravity used by default (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Kinematic surface tension σ/ρ of clean water (m³/s²)
pub const SURFACE_TENSION: f64 = 0.074 / 1000.0;

/// Physical constants shared by all sources of a surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicalParameters {
    /// Gravitational acceleration g
    pub gravity: f64,
    /// Kinematic surface tension σ/ρ
    pub surface_tension: f64,
    /// Attenuation coefficient c of `exp(−c·k²·r)`; zero disables damping
    pub damping: f64,
    /// Damping gate below which contributions are suppressed
    pub validity_cutoff: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            surface_tension: SURFACE_TENSION,
            damping: 0.0,
            validity_cutoff: VALIDITY_CUTOFF,
        }
    }
}

impl PhysicalParameters {
    /// Builder-style override of the damping coefficient
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Angular frequency ω(k)
    #[inline]
    pub fn dispersion(&self, k: f64) -> f64 {
        special::dispersion(k, self.gravity, self.surface_tension)
    }

    /// Group velocity ½ω/k
    #[inline]
    pub fn group_velocity(&self, k: f64) -> f64 {
        special::group_velocity(k, self.gravity, self.surface_tension)
    }

    /// Radial damping factor at distance `r` for wave number `k`
    #[inline]
    pub fn damping(&self, r: f64, k: f64) -> f64 {
        special::damping(r, k, self.damping)
    }

    /// Whether a damping value passes the validity gate
    #[inline]
    pub fn passes_gate(&self, damp: f64) -> bool {
        damp > self.validity_cutoff
    }

    /// Check that every constant is finite and physically meaningful
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("gravity", self.gravity, self.gravity > 0.0),
            ("surface_tension", self.surface_tension, self.surface_tension >= 0.0),
            ("damping", self.damping, self.damping >= 0.0),
            (
                "validity_cutoff",
                self.validity_cutoff,
                (0.0..1.0).contains(&self.validity_cutoff),
            ),
        ];
        for (name, value, ok) in checks {
            if !value.is_finite() || !ok {
                log::debug!("Rejecting physical parameter {} = {}", name, value);
                return Err(WaveError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}
