//! Planar points and small complex vector/matrix aliases

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Complex 2-vector (∂/∂x, ∂/∂y)
pub type Vec2c = [Complex64; 2];

/// Complex 2×2 matrix, row-major
pub type Mat2c = [[Complex64; 2]; 2];

/// Point in the horizontal plane (world units)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point2D {
    /// x-coordinate
    pub x: f64,
    /// y-coordinate
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Point at polar coordinates (r, θ) around `center`
    pub fn from_polar_around(center: Point2D, r: f64, theta: f64) -> Self {
        Self::new(center.x + r * theta.cos(), center.y + r * theta.sin())
    }

    /// Distance to another point
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of `other − self` measured from the positive x-axis
    pub fn angle_to(&self, other: &Point2D) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_distance() {
        let a = Point2D::new(1.0, 1.0);
        let b = Point2D::new(4.0, 5.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_polar_around_center() {
        let c = Point2D::new(2.0, 3.0);
        let p = Point2D::from_polar_around(c, 2.0, PI / 2.0);
        assert!((p.x - 2.0).abs() < 1e-12);
        assert!((p.y - 5.0).abs() < 1e-12);
        assert!((c.angle_to(&p) - PI / 2.0).abs() < 1e-12);
    }
}
