//! Capillary-gravity dispersion and radial attenuation
//!
//! Deep-water dispersion with a surface-tension term:
//! ```text
//! ω(k) = √(g·k + (σ/ρ)·k³)
//! ```
//! and an exponential amplitude decay `exp(−c·k²·r)` with distance.

/// Angular frequency of a wave with wave number `k`
///
/// `surface_tension` is the kinematic coefficient σ/ρ (m³/s²).
#[inline]
pub fn dispersion(k: f64, gravity: f64, surface_tension: f64) -> f64 {
    (gravity * k + surface_tension * k * k * k).sqrt()
}

/// Group velocity `½ ω/k` of the deep-water approximation
#[inline]
pub fn group_velocity(k: f64, gravity: f64, surface_tension: f64) -> f64 {
    0.5 * dispersion(k, gravity, surface_tension) / k
}

/// Radial damping factor `exp(−coefficient·k²·r)`
///
/// Equal to one everywhere when `coefficient` is zero.
#[inline]
pub fn damping(r: f64, k: f64, coefficient: f64) -> f64 {
    (-coefficient * k * k * r).exp()
}

/// Wave number of a wavelength, `2π/λ`
#[inline]
pub fn wave_number(wavelength: f64) -> f64 {
    2.0 * std::f64::consts::PI / wavelength
}
