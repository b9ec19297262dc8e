//! Reflection and refraction of ray directions.
//!
//! Normals are expected to be unit length and oriented against the incident
//! rays, as produced by surface collision.

use lensmaker_math::{convert, Scalar, VectorN};

/// What refraction does with rays beyond the critical angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CriticalAnglePolicy {
    /// Take the square root of the negative radicand; NaN flows downstream.
    Nan,
    /// Clamp the radicand to zero: the ray leaves at grazing incidence.
    Clamp,
    /// Remove the ray from the output.
    #[default]
    Drop,
    /// Reflect the ray instead (total internal reflection).
    Reflect,
}

fn check_batch<S: Scalar>(rays: &[VectorN<S>], normals: &[VectorN<S>]) {
    assert_eq!(
        rays.len(),
        normals.len(),
        "need exactly one normal per ray"
    );
}

/// Mirror reflection of one direction: `V - 2 (V·N) N`, renormalized.
#[inline]
pub fn reflect<S: Scalar>(v: &VectorN<S>, n: &VectorN<S>) -> VectorN<S> {
    (*v - *n * (v.dot(n) * convert(2.0))).normalize()
}

pub fn reflection<S: Scalar>(rays: &[VectorN<S>], normals: &[VectorN<S>]) -> Vec<VectorN<S>> {
    check_batch(rays, normals);
    rays.iter().zip(normals).map(|(v, n)| reflect(v, n)).collect()
}

/// Perpendicular part of the refracted direction and the radicand
/// `1 - |R⊥|²` of its parallel part.
#[inline]
fn snell<S: Scalar>(v: &VectorN<S>, n: &VectorN<S>, mu: S) -> (VectorN<S>, S) {
    let cos_i = -v.dot(n);
    let r_perp = (*v + *n * cos_i) * mu;
    (r_perp, S::one() - r_perp.norm_squared())
}

/// Whether a ray with this radicand is beyond the critical angle.
///
/// A NaN radicand counts as lost so every policy agrees on the same rays.
#[inline]
fn beyond_critical<S: Scalar>(radicand: S) -> bool {
    !(radicand.value() >= 0.0)
}

/// Which rays are beyond the critical angle going from `n1` to `n2`.
pub fn total_internal_reflection<S: Scalar>(
    rays: &[VectorN<S>],
    normals: &[VectorN<S>],
    n1: S,
    n2: S,
) -> Vec<bool> {
    check_batch(rays, normals);
    let mu = n1 / n2;
    rays.iter()
        .zip(normals)
        .map(|(v, n)| beyond_critical(snell(v, n, mu).1))
        .collect()
}

/// Refract unit directions through an interface from index `n1` to `n2`.
///
/// Output has one direction per input ray, except with
/// [`CriticalAnglePolicy::Drop`] where rays beyond the critical angle are
/// left out. Use [`total_internal_reflection`] to know which.
pub fn refraction<S: Scalar>(
    rays: &[VectorN<S>],
    normals: &[VectorN<S>],
    n1: S,
    n2: S,
    policy: CriticalAnglePolicy,
) -> Vec<VectorN<S>> {
    check_batch(rays, normals);
    let mu = n1 / n2;

    rays.iter()
        .zip(normals)
        .filter_map(|(v, n)| {
            let (r_perp, radicand) = snell(v, n, mu);
            if !beyond_critical(radicand) {
                return Some((r_perp - *n * radicand.sqrt()).normalize());
            }
            match policy {
                CriticalAnglePolicy::Nan => Some((r_perp - *n * radicand.sqrt()).normalize()),
                CriticalAnglePolicy::Clamp => Some(r_perp.normalize()),
                CriticalAnglePolicy::Drop => None,
                CriticalAnglePolicy::Reflect => Some(reflect(v, n)),
            }
        })
        .collect()
}
