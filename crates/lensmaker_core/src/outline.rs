//! Aperture outlines bounding the valid domain of a surface.

use lensmaker_math::{Scalar, VectorN};

use crate::error::{check_positive, TraceResult};

/// Aperture shape, measured in the plane orthogonal to the principal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outline {
    /// Disk (3D) or segment (2D) of the given diameter.
    Circular { diameter: f64 },
    /// Square (3D) or segment (2D) of the given side length.
    Square { side_length: f64 },
}

impl Outline {
    pub fn circular(diameter: f64) -> TraceResult<Self> {
        Ok(Outline::Circular {
            diameter: check_positive("diameter", diameter)?,
        })
    }

    pub fn square(side_length: f64) -> TraceResult<Self> {
        Ok(Outline::Square {
            side_length: check_positive("side length", side_length)?,
        })
    }

    /// Half-width of the aperture along a transverse axis.
    pub fn max_radius(&self) -> f64 {
        match *self {
            Outline::Circular { diameter } => diameter / 2.0,
            Outline::Square { side_length } => side_length / 2.0,
        }
    }

    /// Whether a local point projects inside the aperture.
    ///
    /// Non-finite points are never contained.
    pub fn contains_point<S: Scalar>(&self, point: &VectorN<S>) -> bool {
        let half = self.max_radius();
        match self {
            Outline::Circular { .. } => point.radial_squared().value() <= half * half,
            Outline::Square { .. } => point
                .transverse()
                .iter()
                .all(|c| c.value().abs() <= half),
        }
    }

    pub fn contains<S: Scalar>(&self, points: &[VectorN<S>]) -> Vec<bool> {
        points.iter().map(|p| self.contains_point(p)).collect()
    }
}
