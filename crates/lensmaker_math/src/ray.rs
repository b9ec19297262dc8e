//! Batches of parametric rays.

use crate::{Scalar, VectorN};

/// A batch of N rays `P + tV`.
///
/// Origins and directions are stored as two arrays of equal length. Every
/// vector has the batch dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct RayBatch<S: Scalar> {
    points: Vec<VectorN<S>>,
    vectors: Vec<VectorN<S>>,
    dim: usize,
}

impl<S: Scalar> RayBatch<S> {
    /// An empty batch.
    pub fn empty(dim: usize) -> Self {
        assert!(dim == 2 || dim == 3, "dimension must be 2 or 3, got {dim}");
        Self {
            points: Vec::new(),
            vectors: Vec::new(),
            dim,
        }
    }

    /// Create a batch from origins and directions.
    ///
    /// Panics if the arrays differ in length or any vector has the wrong
    /// dimension.
    pub fn new(dim: usize, points: Vec<VectorN<S>>, vectors: Vec<VectorN<S>>) -> Self {
        assert_eq!(
            points.len(),
            vectors.len(),
            "ray batch needs as many points as vectors"
        );
        assert!(
            points.iter().chain(&vectors).all(|v| v.dim() == dim),
            "ray batch vectors must have dimension {dim}"
        );
        Self {
            points,
            vectors,
            dim,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[VectorN<S>] {
        &self.points
    }

    #[inline]
    pub fn vectors(&self) -> &[VectorN<S>] {
        &self.vectors
    }

    /// Points along every ray at its own parameter: `P_i + t_i V_i`.
    pub fn at(&self, t: &[S]) -> Vec<VectorN<S>> {
        assert_eq!(t.len(), self.len(), "one parameter per ray");
        self.points
            .iter()
            .zip(&self.vectors)
            .zip(t)
            .map(|((&p, &v), &t)| p + v * t)
            .collect()
    }

    /// Append another batch after this one.
    pub fn concat(&self, other: &RayBatch<S>) -> RayBatch<S> {
        assert_eq!(self.dim, other.dim, "dimension mismatch");
        let mut points = self.points.clone();
        let mut vectors = self.vectors.clone();
        points.extend_from_slice(&other.points);
        vectors.extend_from_slice(&other.vectors);
        RayBatch::new(self.dim, points, vectors)
    }

    /// Rays whose mask entry is true, in order.
    pub fn select(&self, mask: &[bool]) -> RayBatch<S> {
        RayBatch::new(
            self.dim,
            masked(&self.points, mask),
            masked(&self.vectors, mask),
        )
    }
}

/// Items whose mask entry is true, in order.
pub fn masked<T: Copy>(items: &[T], mask: &[bool]) -> Vec<T> {
    assert_eq!(items.len(), mask.len(), "mask length must match batch length");
    items
        .iter()
        .zip(mask)
        .filter_map(|(&item, &keep)| keep.then_some(item))
        .collect()
}
