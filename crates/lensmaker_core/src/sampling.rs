//! Sampling configuration for one simulation run.

use lensmaker_math::{convert, Precision, Scalar};

/// How a simulation run samples space.
///
/// Fixed for the whole run; not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    /// Spatial dimension, 2 or 3
    pub dim: usize,
    /// Precision of the scalar type the run computes with
    pub precision: Precision,
    /// Rays per aperture axis (a 3D source emits `base * base` rays)
    pub base: usize,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            dim: 2,
            precision: Precision::F64,
            base: 10,
        }
    }
}

impl Sampling {
    /// Sampling for scalar type `S`.
    pub fn new<S: Scalar>(dim: usize, base: usize) -> Self {
        assert!(dim == 2 || dim == 3, "dimension must be 2 or 3, got {dim}");
        Self {
            dim,
            precision: S::PRECISION,
            base,
        }
    }

    /// Viewing defaults used by the scene exporter.
    pub fn for_view(dim: usize) -> Self {
        Self::new::<f64>(dim, 10)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// A single sample sits at `start`. The last sample is exactly `end`.
pub(crate) fn linspace<S: Scalar>(start: S, end: S, n: usize) -> Vec<S> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / convert((n - 1) as f64);
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + step * convert(i as f64)
                    }
                })
                .collect()
        }
    }
}
