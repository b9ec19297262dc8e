//! Affine transforms and kinematic chain composition.
//!
//! Linear parts always travel with an explicit inverse. Composition multiplies
//! the matrices and, separately and in reverse order, their inverses, so both
//! directions of a composed chain stay exact without numeric inversion.

use glam::{DAffine3, DMat4};

use crate::{MatrixN, Scalar, VectorN};

/// A frame change between two coordinate systems.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform<S: Scalar> {
    /// No-op.
    Identity { dim: usize },
    /// `p + b`.
    Translate(VectorN<S>),
    /// `M p`, with `M⁻¹` stored alongside.
    Linear {
        matrix: MatrixN<S>,
        inverse: MatrixN<S>,
    },
    /// `M p + b`, produced by composing chains with a linear part.
    Affine {
        matrix: MatrixN<S>,
        inverse: MatrixN<S>,
        translation: VectorN<S>,
    },
}

impl<S: Scalar> Transform<S> {
    pub fn identity(dim: usize) -> Self {
        assert!(dim == 2 || dim == 3, "dimension must be 2 or 3, got {dim}");
        Transform::Identity { dim }
    }

    pub fn translate(offset: VectorN<S>) -> Self {
        Transform::Translate(offset)
    }

    /// Linear transform from a matrix and its known inverse.
    pub fn linear(matrix: MatrixN<S>, inverse: MatrixN<S>) -> Self {
        assert_eq!(matrix.dim(), inverse.dim(), "dimension mismatch");
        Transform::Linear { matrix, inverse }
    }

    /// Uniform scaling by `s` with the inverse scale precomputed.
    pub fn scale(dim: usize, s: S) -> Self {
        Transform::linear(
            MatrixN::scaling(dim, s),
            MatrixN::scaling(dim, S::one() / s),
        )
    }

    pub fn dim(&self) -> usize {
        match self {
            Transform::Identity { dim } => *dim,
            Transform::Translate(offset) => offset.dim(),
            Transform::Linear { matrix, .. } | Transform::Affine { matrix, .. } => matrix.dim(),
        }
    }

    /// `(M, M⁻¹, b)` such that the transform is `M p + b`.
    fn affine_parts(&self) -> (MatrixN<S>, MatrixN<S>, VectorN<S>) {
        let dim = self.dim();
        match self {
            Transform::Identity { .. } => (
                MatrixN::identity(dim),
                MatrixN::identity(dim),
                VectorN::zeros(dim),
            ),
            Transform::Translate(offset) => {
                (MatrixN::identity(dim), MatrixN::identity(dim), *offset)
            }
            Transform::Linear { matrix, inverse } => (*matrix, *inverse, VectorN::zeros(dim)),
            Transform::Affine {
                matrix,
                inverse,
                translation,
            } => (*matrix, *inverse, *translation),
        }
    }

    /// Transform that applies `self` first, then `next`.
    pub fn then(&self, next: &Transform<S>) -> Transform<S> {
        assert_eq!(self.dim(), next.dim(), "dimension mismatch");
        match (self, next) {
            (Transform::Identity { .. }, other) | (other, Transform::Identity { .. }) => {
                other.clone()
            }
            (Transform::Translate(a), Transform::Translate(b)) => Transform::Translate(*a + *b),
            _ => {
                let (m1, i1, b1) = self.affine_parts();
                let (m2, i2, b2) = next.affine_parts();
                Transform::Affine {
                    matrix: m2 * m1,
                    inverse: i1 * i2,
                    translation: m2 * b1 + b2,
                }
            }
        }
    }

    /// Exact inverse transform.
    pub fn inverse(&self) -> Transform<S> {
        match self {
            Transform::Identity { dim } => Transform::Identity { dim: *dim },
            Transform::Translate(offset) => Transform::Translate(-*offset),
            Transform::Linear { matrix, inverse } => Transform::Linear {
                matrix: *inverse,
                inverse: *matrix,
            },
            Transform::Affine {
                matrix,
                inverse,
                translation,
            } => Transform::Affine {
                matrix: *inverse,
                inverse: *matrix,
                translation: -(*inverse * *translation),
            },
        }
    }

    pub fn direct_point(&self, p: &VectorN<S>) -> VectorN<S> {
        assert_eq!(self.dim(), p.dim(), "dimension mismatch");
        match self {
            Transform::Identity { .. } => *p,
            Transform::Translate(offset) => *p + *offset,
            Transform::Linear { matrix, .. } => *matrix * *p,
            Transform::Affine {
                matrix,
                translation,
                ..
            } => *matrix * *p + *translation,
        }
    }

    /// Map a direction; translation does not apply.
    pub fn direct_vector(&self, v: &VectorN<S>) -> VectorN<S> {
        assert_eq!(self.dim(), v.dim(), "dimension mismatch");
        match self {
            Transform::Identity { .. } | Transform::Translate(_) => *v,
            Transform::Linear { matrix, .. } | Transform::Affine { matrix, .. } => *matrix * *v,
        }
    }

    /// Map a surface normal with the inverse transpose, renormalized.
    pub fn direct_normal(&self, n: &VectorN<S>) -> VectorN<S> {
        assert_eq!(self.dim(), n.dim(), "dimension mismatch");
        match self {
            Transform::Identity { .. } | Transform::Translate(_) => *n,
            Transform::Linear { inverse, .. } | Transform::Affine { inverse, .. } => {
                (inverse.transpose() * *n).normalize()
            }
        }
    }

    pub fn inverse_point(&self, p: &VectorN<S>) -> VectorN<S> {
        assert_eq!(self.dim(), p.dim(), "dimension mismatch");
        match self {
            Transform::Identity { .. } => *p,
            Transform::Translate(offset) => *p - *offset,
            Transform::Linear { inverse, .. } => *inverse * *p,
            Transform::Affine {
                inverse,
                translation,
                ..
            } => *inverse * (*p - *translation),
        }
    }

    pub fn inverse_vector(&self, v: &VectorN<S>) -> VectorN<S> {
        assert_eq!(self.dim(), v.dim(), "dimension mismatch");
        match self {
            Transform::Identity { .. } | Transform::Translate(_) => *v,
            Transform::Linear { inverse, .. } | Transform::Affine { inverse, .. } => *inverse * *v,
        }
    }

    pub fn direct_points(&self, points: &[VectorN<S>]) -> Vec<VectorN<S>> {
        points.iter().map(|p| self.direct_point(p)).collect()
    }

    pub fn direct_vectors(&self, vectors: &[VectorN<S>]) -> Vec<VectorN<S>> {
        vectors.iter().map(|v| self.direct_vector(v)).collect()
    }

    pub fn direct_normals(&self, normals: &[VectorN<S>]) -> Vec<VectorN<S>> {
        normals.iter().map(|n| self.direct_normal(n)).collect()
    }

    pub fn inverse_points(&self, points: &[VectorN<S>]) -> Vec<VectorN<S>> {
        points.iter().map(|p| self.inverse_point(p)).collect()
    }

    pub fn inverse_vectors(&self, vectors: &[VectorN<S>]) -> Vec<VectorN<S>> {
        vectors.iter().map(|v| self.inverse_vector(v)).collect()
    }

    /// Homogeneous 4x4 matrix of the primal values, for viewers.
    ///
    /// 2D transforms act on the xy plane.
    pub fn to_dmat4(&self) -> DMat4 {
        let (matrix, _, translation) = self.affine_parts();
        DMat4::from(DAffine3 {
            matrix3: matrix.to_dmat3(),
            translation: translation.to_dvec3(),
        })
    }
}

/// Compose a kinematic chain into one transform.
///
/// The chain runs from the global frame inward: every transform is expressed
/// in the frame established by the ones before it, so the result is
/// `T1 ∘ T2 ∘ … ∘ Tn` and maps points of the innermost frame to global
/// coordinates. An empty or all-identity chain gives `Identity`.
pub fn forward_kinematic<S: Scalar>(dim: usize, chain: &[Transform<S>]) -> Transform<S> {
    chain
        .iter()
        .fold(Transform::identity(dim), |outer, t| t.then(&outer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use proptest::prelude::*;

    fn close(a: &VectorN<f64>, b: &VectorN<f64>, tol: f64) -> bool {
        (*a - *b).norm() < tol
    }

    fn rotation(dim: usize, theta: f64) -> Transform<f64> {
        Transform::linear(
            MatrixN::rotation_z(dim, theta),
            MatrixN::rotation_z(dim, -theta),
        )
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let t: Transform<f64> = forward_kinematic(3, &[]);
        assert_eq!(t, Transform::Identity { dim: 3 });

        let all_identity = vec![Transform::<f64>::identity(2); 4];
        assert_eq!(
            forward_kinematic(2, &all_identity),
            Transform::Identity { dim: 2 }
        );
    }

    #[test]
    fn test_translations_collapse() {
        let chain = vec![
            Transform::translate(VectorN::new2(1.0, 0.0)),
            Transform::identity(2),
            Transform::translate(VectorN::new2(2.5, -1.0)),
        ];
        assert_eq!(
            forward_kinematic(2, &chain),
            Transform::Translate(VectorN::new2(3.5, -1.0))
        );
    }

    #[test]
    fn test_scale_carries_inverse() {
        let t = Transform::scale(3, 4.0);
        let p = VectorN::new3(1.0, 2.0, 3.0);
        assert_eq!(t.direct_point(&p), VectorN::new3(4.0, 8.0, 12.0));
        assert_eq!(t.inverse_point(&t.direct_point(&p)), p);
        match t.inverse() {
            Transform::Linear { matrix, .. } => assert_eq!(matrix.get(0, 0), 0.25),
            other => panic!("expected linear inverse, got {other:?}"),
        }
    }

    #[test]
    fn test_vectors_ignore_translation() {
        let chain = vec![
            Transform::translate(VectorN::new2(10.0, 20.0)),
            Transform::scale(2, 2.0),
        ];
        let t = forward_kinematic(2, &chain);
        assert_eq!(
            t.direct_vector(&VectorN::new2(1.0, 0.0)),
            VectorN::new2(2.0, 0.0)
        );
        // Scale acts in the translated frame
        assert_eq!(
            t.direct_point(&VectorN::new2(1.0, 1.0)),
            VectorN::new2(12.0, 22.0)
        );
    }

    #[test]
    fn test_normals_use_inverse_transpose() {
        let stretch = Transform::linear(
            MatrixN::from_rows(&[&[2.0, 0.0], &[0.0, 1.0]]),
            MatrixN::from_rows(&[&[0.5, 0.0], &[0.0, 1.0]]),
        );
        // Normal of the line y = x
        let n = VectorN::new2(-1.0, 1.0).normalize();
        let mapped = stretch.direct_normal(&n);
        // The line maps to y = x / 2, whose normal is (-1, 2)
        let expected = VectorN::new2(-1.0, 2.0).normalize();
        assert!(close(&mapped, &expected, 1e-12));
    }

    #[test]
    fn test_to_dmat4() {
        let chain = vec![
            Transform::scale(2, 2.0),
            Transform::translate(VectorN::new2(1.0, 3.0)),
        ];
        let m = forward_kinematic(2, &chain).to_dmat4();
        let p = m.transform_point3(DVec3::new(1.0, 1.0, 0.0));
        assert!((p - DVec3::new(4.0, 8.0, 0.0)).length() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_composed_chain_matches_sequential(
            tx in -10.0..10.0f64,
            ty in -10.0..10.0f64,
            s in 0.1..5.0f64,
            theta in -3.0..3.0f64,
            px in -5.0..5.0f64,
            py in -5.0..5.0f64,
        ) {
            let chain = vec![
                Transform::translate(VectorN::new2(tx, ty)),
                Transform::scale(2, s),
                rotation(2, theta),
                Transform::identity(2),
                Transform::translate(VectorN::new2(ty, -tx)),
            ];
            let p = VectorN::new2(px, py);

            // Innermost transform acts first
            let sequential = chain.iter().rev().fold(p, |acc, t| t.direct_point(&acc));
            let composed = forward_kinematic(2, &chain);
            prop_assert!(close(&composed.direct_point(&p), &sequential, 1e-9));

            // Associativity: grouping the chain differently gives the same map
            let outer = forward_kinematic(2, &chain[..2]);
            let inner = forward_kinematic(2, &chain[2..]);
            prop_assert!(close(&inner.then(&outer).direct_point(&p), &sequential, 1e-9));
        }

        #[test]
        fn prop_transform_then_inverse_is_identity(
            tx in -10.0..10.0f64,
            s in 0.1..5.0f64,
            theta in -3.0..3.0f64,
            px in -5.0..5.0f64,
            py in -5.0..5.0f64,
            pz in -5.0..5.0f64,
        ) {
            let chain = vec![
                Transform::translate(VectorN::new3(tx, 1.0, -2.0)),
                rotation(3, theta),
                Transform::scale(3, s),
            ];
            let t = forward_kinematic(3, &chain);
            let round_trip = t.then(&t.inverse());
            let p = VectorN::new3(px, py, pz);
            prop_assert!(close(&round_trip.direct_point(&p), &p, 1e-9));
            prop_assert!(close(&t.inverse_point(&t.direct_point(&p)), &p, 1e-9));
        }
    }
}
