//! Collision of global rays with a placed surface.

use lensmaker_math::{RayBatch, Scalar, Transform, VectorN};

use crate::newton::NewtonConfig;
use crate::surfaces::Surface;

/// Collision points and normals in the global frame.
///
/// One entry per input ray; `valid` tells which entries are real hits.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<S: Scalar> {
    pub points: Vec<VectorN<S>>,
    pub normals: Vec<VectorN<S>>,
    pub valid: Vec<bool>,
}

impl<S: Scalar> Intersection<S> {
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }
}

/// Intersect global rays with `surface` placed by `transform`.
///
/// Rays are mapped into the surface's local frame, collided there, and the
/// results mapped back. Normals keep facing against the rays.
pub fn intersect<S: Scalar>(
    surface: &Surface<S>,
    rays: &RayBatch<S>,
    transform: &Transform<S>,
    config: &NewtonConfig,
) -> Intersection<S> {
    let local_points = transform.inverse_points(rays.points());
    let local_vectors = transform.inverse_vectors(rays.vectors());

    let hit = surface.local_collide_with(&local_points, &local_vectors, config);
    let local_hits = RayBatch::new(rays.dim(), local_points, local_vectors).at(&hit.t);

    Intersection {
        points: transform.direct_points(&local_hits),
        normals: transform.direct_normals(&hit.normals),
        valid: hit.valid,
    }
}
