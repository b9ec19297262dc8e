//! Newton's method for ray / implicit surface intersection.
//!
//! Iterations run on detached values so no derivative history builds up.
//! A single final step is taken with derivative tracking on, which is enough
//! for gradients of the collision point with respect to the surface
//! parameters and the incoming rays: at convergence the implicit function
//! theorem gives exactly the derivative of that last step.

use lensmaker_math::{Scalar, VectorN};
use rayon::prelude::*;

use crate::surfaces::ImplicitSurface;

/// Settings for implicit surface collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    /// Iterations run without derivative tracking
    pub iterations: usize,
    /// Largest `|F|` at which a collision point is accepted
    pub tolerance: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            tolerance: 1e-3,
        }
    }
}

/// Newton update for one ray: `F(P + tV) / (∇F(P + tV) · V)`.
///
/// A ray tangent to the surface divides by zero and yields a non-finite
/// update.
pub fn newton_delta<S: Scalar>(
    surface: &ImplicitSurface<S>,
    point: &VectorN<S>,
    vector: &VectorN<S>,
    t: S,
) -> S {
    let at = *point + *vector * t;
    surface.implicit(&at) / surface.implicit_grad(&at).dot(vector)
}

/// Solve `F(P + tV) = 0` for every ray, starting from `init_t`.
///
/// Runs `iterations` detached steps and then one attached step. Rays are
/// independent and solved in parallel; output order matches input order.
pub fn intersect_newton<S: Scalar>(
    surface: &ImplicitSurface<S>,
    points: &[VectorN<S>],
    vectors: &[VectorN<S>],
    init_t: &[S],
    iterations: usize,
) -> Vec<S> {
    let detached = surface.detach();

    points
        .par_iter()
        .zip(vectors.par_iter())
        .zip(init_t.par_iter())
        .map(|((point, vector), &t0)| {
            let (p, v) = (point.detach(), vector.detach());
            let mut t = t0.detach();
            for _ in 0..iterations {
                t = t - newton_delta(&detached, &p, &v, t);
            }
            t - newton_delta(surface, point, vector, t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surfaces::{Parabola, Sphere};

    #[test]
    fn test_converges_on_sphere() {
        let surface = ImplicitSurface::Sphere(Sphere::new(10.0, 8.0_f64).unwrap());
        let points = vec![VectorN::new2(-3.0, 1.5), VectorN::new2(-3.0, -4.0)];
        let vectors = vec![VectorN::new2(1.0, 0.0); 2];
        let t = intersect_newton(&surface, &points, &vectors, &[3.0, 3.0], 20);

        for i in 0..2 {
            let p = points[i] + vectors[i] * t[i];
            assert!(surface.implicit(&p).abs() < 1e-6);
            assert!(newton_delta(&surface, &points[i], &vectors[i], t[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_oblique_ray_on_parabola() {
        let surface = ImplicitSurface::Parabola(Parabola::new(10.0, 0.1_f64).unwrap());
        let points = vec![VectorN::new3(-2.0, 0.0, 0.0)];
        let vectors = vec![VectorN::new3(1.0, 0.3, 0.2).normalize()];
        let init = [2.0 / vectors[0].x()];
        let t = intersect_newton(&surface, &points, &vectors, &init, 20);

        let p = points[0] + vectors[0] * t[0];
        assert!(surface.implicit(&p).abs() < 1e-9);
    }

    #[test]
    fn test_zero_iterations_takes_single_step() {
        // One attached Newton step from t = 0 on x = a r² for a ray along x
        let surface = ImplicitSurface::Parabola(Parabola::new(10.0, 0.5_f64).unwrap());
        let points = vec![VectorN::new2(-1.0, 0.0)];
        let vectors = vec![VectorN::new2(1.0, 0.0)];
        let t = intersect_newton(&surface, &points, &vectors, &[0.0], 0);
        assert!((t[0] - 1.0).abs() < 1e-12);
    }
}
