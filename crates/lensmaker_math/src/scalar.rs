//! Scalar abstraction for differentiable tracing.
//!
//! Every quantity derived from element parameters is computed with a type
//! implementing [`Scalar`]: any nalgebra [`RealField`] that can also report
//! its primal value and drop its derivative part. Plain `f32` and `f64` give
//! ordinary tracing; with the `dual` feature, `num_dual::Dual64` gives
//! forward-mode gradients through exactly the same formulas.

use nalgebra::RealField;

/// Floating point precision of a tracing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precision {
    F32,
    #[default]
    F64,
}

/// Numeric type the tracer computes with.
///
/// Comparisons that decide masks (validity, critical angle) are made on
/// [`Scalar::value`], so they never need to be differentiable.
pub trait Scalar: RealField + Copy {
    /// Precision of the primal value.
    const PRECISION: Precision;

    /// Primal value, with any derivative information dropped.
    fn value(self) -> f64;

    /// Same value with derivative tracking removed.
    ///
    /// Identity for plain floats.
    fn detach(self) -> Self;
}

impl Scalar for f32 {
    const PRECISION: Precision = Precision::F32;

    #[inline]
    fn value(self) -> f64 {
        self as f64
    }

    #[inline]
    fn detach(self) -> Self {
        self
    }
}

impl Scalar for f64 {
    const PRECISION: Precision = Precision::F64;

    #[inline]
    fn value(self) -> f64 {
        self
    }

    #[inline]
    fn detach(self) -> Self {
        self
    }
}

#[cfg(feature = "dual")]
impl Scalar for num_dual::Dual64 {
    const PRECISION: Precision = Precision::F64;

    #[inline]
    fn value(self) -> f64 {
        self.re
    }

    #[inline]
    fn detach(self) -> Self {
        num_dual::Dual64::new(self.re, 0.0)
    }
}
