//! Surfaces placed in a sequence, with the way they bend light.

use lensmaker_math::{convert, forward_kinematic, masked, RayBatch, Scalar, Transform};

use crate::error::{check_positive, TraceResult};
use crate::intersect::intersect;
use crate::newton::NewtonConfig;
use crate::physics::{reflection, refraction, total_internal_reflection, CriticalAnglePolicy};
use crate::state::SimulationState;
use crate::surfaces::Surface;

/// Reference point of a surface used to attach it to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The surface vertex
    #[default]
    Origin,
    /// The point on the principal axis level with the aperture edge
    Extent,
}

/// What happens to rays that hit the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction<S: Scalar> {
    Refraction {
        n1: S,
        n2: S,
        policy: CriticalAnglePolicy,
    },
    Reflection,
}

impl<S: Scalar> Interaction<S> {
    /// Refractive indices must be positive and finite.
    fn validate(&self) -> TraceResult<()> {
        if let Interaction::Refraction { n1, n2, .. } = self {
            check_positive("n1", n1.value())?;
            check_positive("n2", n2.value())?;
        }
        Ok(())
    }
}

impl<S: Scalar> Default for Interaction<S> {
    fn default() -> Self {
        Interaction::Refraction {
            n1: S::one(),
            n2: convert(1.5),
            policy: CriticalAnglePolicy::Clamp,
        }
    }
}

/// A surface element of an optical sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalSurface<S: Scalar> {
    surface: Surface<S>,
    scale: S,
    anchors: (Anchor, Anchor),
    interaction: Interaction<S>,
    newton: NewtonConfig,
}

impl<S: Scalar> OpticalSurface<S> {
    /// Unscaled refracting surface anchored at its vertex on both sides.
    pub fn new(surface: impl Into<Surface<S>>) -> Self {
        Self {
            surface: surface.into(),
            scale: S::one(),
            anchors: (Anchor::Origin, Anchor::Origin),
            interaction: Interaction::default(),
            newton: NewtonConfig::default(),
        }
    }

    /// Refracting surface from index `n1` into index `n2`.
    pub fn refractive(surface: impl Into<Surface<S>>, n1: S, n2: S) -> TraceResult<Self> {
        Self::new(surface).with_interaction(Interaction::Refraction {
            n1,
            n2,
            policy: CriticalAnglePolicy::Clamp,
        })
    }

    /// Mirror.
    pub fn reflective(surface: impl Into<Surface<S>>) -> Self {
        let mut element = Self::new(surface);
        element.interaction = Interaction::Reflection;
        element
    }

    pub fn with_scale(mut self, scale: S) -> TraceResult<Self> {
        check_positive("scale", scale.value())?;
        self.scale = scale;
        Ok(self)
    }

    /// Where the surface attaches to the incoming chain, and where the chain
    /// continues after it.
    pub fn with_anchors(mut self, before: Anchor, after: Anchor) -> Self {
        self.anchors = (before, after);
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction<S>) -> TraceResult<Self> {
        interaction.validate()?;
        self.interaction = interaction;
        Ok(self)
    }

    /// Change the critical angle policy. No effect on mirrors.
    pub fn with_policy(mut self, policy: CriticalAnglePolicy) -> Self {
        if let Interaction::Refraction { policy: p, .. } = &mut self.interaction {
            *p = policy;
        }
        self
    }

    pub fn with_newton(mut self, newton: NewtonConfig) -> Self {
        self.newton = newton;
        self
    }

    pub fn surface(&self) -> &Surface<S> {
        &self.surface
    }

    pub fn scale(&self) -> S {
        self.scale
    }

    pub fn anchors(&self) -> (Anchor, Anchor) {
        self.anchors
    }

    pub fn interaction(&self) -> &Interaction<S> {
        &self.interaction
    }

    /// Placement of the surface relative to the incoming chain.
    pub fn surface_transform(&self, dim: usize) -> Vec<Transform<S>> {
        let mut transforms = Vec::with_capacity(2);
        if self.anchors.0 == Anchor::Extent {
            transforms.push(Transform::translate(self.surface.extent(dim) * -self.scale));
        }
        transforms.push(Transform::scale(dim, self.scale));
        transforms
    }

    /// Contribution of this element to the chain seen by the next one.
    pub fn chain_transform(&self, dim: usize) -> Vec<Transform<S>> {
        let extent = self.surface.extent(dim) * self.scale;
        let mut transforms = Vec::with_capacity(2);
        if self.anchors.0 == Anchor::Extent {
            transforms.push(Transform::translate(-extent));
        }
        if self.anchors.1 == Anchor::Extent {
            transforms.push(Transform::translate(extent));
        }
        transforms
    }

    /// Local-to-global transform of the surface for the incoming state.
    pub fn placement(&self, input: &SimulationState<S>) -> Transform<S> {
        let dim = input.dim();
        let chain = [input.transforms(), self.surface_transform(dim).as_slice()].concat();
        forward_kinematic(dim, &chain)
    }

    /// Collide the incoming rays and bend the ones that hit.
    ///
    /// Output rays start at the collision points. `blocked` is indexed like
    /// the input batch.
    pub fn forward(&self, input: &SimulationState<S>) -> SimulationState<S> {
        let dim = input.dim();
        let placement = self.placement(input);

        let hit = intersect(&self.surface, input.rays(), &placement, &self.newton);
        let mut valid = hit.valid;

        let incident = masked(input.rays().vectors(), &valid);
        let normals = masked(&hit.normals, &valid);
        let mut points = masked(&hit.points, &valid);

        let vectors = match self.interaction {
            Interaction::Reflection => reflection(&incident, &normals),
            Interaction::Refraction { n1, n2, policy } => {
                if policy == CriticalAnglePolicy::Drop {
                    let lost = total_internal_reflection(&incident, &normals, n1, n2);
                    let kept: Vec<bool> = lost.iter().map(|&l| !l).collect();
                    points = masked(&points, &kept);
                    for (v, &l) in valid.iter_mut().filter(|v| **v).zip(&lost) {
                        *v = !l;
                    }
                }
                refraction(&incident, &normals, n1, n2, policy)
            }
        };

        let blocked: Vec<bool> = valid.iter().map(|&v| !v).collect();
        if points.is_empty() && !input.rays().is_empty() {
            log::warn!("surface blocked all {} incoming rays", input.rays().len());
        } else {
            log::debug!(
                "surface: {} rays in, {} out, {} blocked",
                input.rays().len(),
                points.len(),
                blocked.iter().filter(|&&b| b).count()
            );
        }

        input
            .clone()
            .with_rays(RayBatch::new(dim, points, vectors))
            .with_blocked(blocked)
            .extend_chain(self.chain_transform(dim))
    }

    pub fn named_parameters(&self) -> Vec<(&'static str, S)> {
        self.surface.named_parameters()
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut S> {
        self.surface.parameter_mut(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TraceError;
    use crate::sampling::Sampling;
    use crate::surfaces::{Plane, Sphere};
    use lensmaker_math::VectorN;

    fn state_with_rays(points: Vec<VectorN<f64>>, vectors: Vec<VectorN<f64>>) -> SimulationState<f64> {
        SimulationState::new(Sampling::default()).with_rays(RayBatch::new(2, points, vectors))
    }

    #[test]
    fn test_transforms_follow_anchors() {
        // extent = 10 - sqrt(75), scaled by 2
        let element = OpticalSurface::new(Sphere::new(10.0, 10.0).unwrap())
            .with_scale(2.0)
            .unwrap()
            .with_anchors(Anchor::Extent, Anchor::Extent);
        let e = 2.0 * (10.0 - 75.0_f64.sqrt());

        let placement = forward_kinematic(2, &element.surface_transform(2));
        // The extent point lands on the chain position
        let local_extent = VectorN::new2(10.0 - 75.0_f64.sqrt(), 0.0);
        assert!(placement.direct_point(&local_extent).norm() < 1e-12);
        // The vertex sits behind it
        assert!((placement.direct_point(&VectorN::zeros(2)).x() + e).abs() < 1e-12);

        let chain = forward_kinematic(2, &element.chain_transform(2));
        assert!(chain.direct_point(&VectorN::zeros(2)).norm() < 1e-12);

        let origin_extent = element.with_anchors(Anchor::Origin, Anchor::Extent);
        assert_eq!(origin_extent.surface_transform(2).len(), 1);
        let chain = forward_kinematic(2, &origin_extent.chain_transform(2));
        assert!((chain.direct_point(&VectorN::zeros(2)).x() - e).abs() < 1e-12);
    }

    #[test]
    fn test_blocked_rays_leave_batch() {
        let element = OpticalSurface::refractive(Plane::circular(4.0).unwrap(), 1.0, 1.5).unwrap();
        let input = state_with_rays(
            vec![
                VectorN::new2(-1.0, 0.0),
                VectorN::new2(-1.0, 3.0),
                VectorN::new2(-1.0, 1.0),
            ],
            vec![VectorN::new2(1.0, 0.0); 3],
        );
        let output = element.forward(&input);

        assert_eq!(output.rays().len(), 2);
        assert_eq!(output.blocked(), Some(&[false, true, false][..]));
        assert_eq!(output.rays().points()[1], VectorN::new2(0.0, 1.0));
        assert_eq!(output.rays().vectors()[0], VectorN::new2(1.0, 0.0));
        assert_eq!(output.transforms().len(), 1);
    }

    #[test]
    fn test_mirror_sends_rays_back() {
        let element = OpticalSurface::reflective(Plane::circular(4.0).unwrap());
        let input = state_with_rays(
            vec![VectorN::new2(-1.0, 0.5)],
            vec![VectorN::new2(1.0, 1.0).normalize()],
        );
        let output = element.forward(&input);
        let v = output.rays().vectors()[0];
        assert!((v.x() + 0.5_f64.sqrt()).abs() < 1e-12);
        assert!((v.get(1) - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_drop_blocks_lost_rays() {
        let element = OpticalSurface::refractive(Plane::circular(10.0).unwrap(), 1.5, 1.0)
            .unwrap()
            .with_policy(CriticalAnglePolicy::Drop);
        let steep = VectorN::new2(1.0, 2.0).normalize();
        let input = state_with_rays(
            vec![VectorN::new2(-1.0, 0.0), VectorN::new2(-1.0, 0.0)],
            vec![VectorN::new2(1.0, 0.0), steep],
        );
        let output = element.forward(&input);

        assert_eq!(output.rays().len(), 1);
        assert_eq!(output.rays().vectors().len(), 1);
        assert_eq!(output.blocked(), Some(&[false, true][..]));
        assert_eq!(output.blocked_count(), 1);
    }

    #[test]
    fn test_refractive_indices_are_validated() {
        let plane = Plane::circular(10.0).unwrap();
        let err = OpticalSurface::refractive(plane, 0.0, 0.0).unwrap_err();
        assert_eq!(err, TraceError::NonPositive { name: "n1", value: 0.0 });
        assert!(OpticalSurface::refractive(plane, 1.0, f64::NAN).is_err());
        assert!(OpticalSurface::refractive(plane, -1.5, 1.0).is_err());

        let element = OpticalSurface::<f64>::new(plane);
        let err = element
            .clone()
            .with_interaction(Interaction::Refraction {
                n1: 1.0,
                n2: 0.0,
                policy: CriticalAnglePolicy::Drop,
            })
            .unwrap_err();
        assert_eq!(err, TraceError::NonPositive { name: "n2", value: 0.0 });
        assert!(element.with_interaction(Interaction::Reflection).is_ok());
    }

    #[test]
    fn test_invalid_scale() {
        let element = OpticalSurface::<f64>::new(Plane::circular(1.0).unwrap());
        assert!(element.with_scale(0.0).is_err());
    }
}
