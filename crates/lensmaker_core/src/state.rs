//! The state threaded through an optical sequence.

use lensmaker_math::{forward_kinematic, RayBatch, Scalar, Transform, VectorN};

use crate::sampling::Sampling;

/// Rays, kinematic chain and sampling at one point of a sequence.
///
/// Elements never mutate a state: they consume one and build the next with
/// the `with_*` / `extend_chain` builders.
///
/// After a surface, `blocked` is indexed like that surface's *input* batch
/// and is true for rays that missed it or were lost to total internal
/// reflection. `rays` keeps only the others, so the mask is usually longer
/// than the batch; `rays().len() + blocked_count()` equals the input length.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState<S: Scalar> {
    sampling: Sampling,
    transforms: Vec<Transform<S>>,
    rays: RayBatch<S>,
    blocked: Option<Vec<bool>>,
}

impl<S: Scalar> SimulationState<S> {
    /// Initial state of a run: no rays and an identity chain.
    ///
    /// Panics if the sampling precision does not match `S`.
    pub fn new(sampling: Sampling) -> Self {
        assert_eq!(
            sampling.precision,
            S::PRECISION,
            "sampling precision does not match the scalar type"
        );
        Self {
            sampling,
            transforms: vec![Transform::identity(sampling.dim)],
            rays: RayBatch::empty(sampling.dim),
            blocked: None,
        }
    }

    pub fn sampling(&self) -> &Sampling {
        &self.sampling
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.sampling.dim
    }

    /// Kinematic chain from the global frame to the current position.
    ///
    /// Never empty.
    pub fn transforms(&self) -> &[Transform<S>] {
        &self.transforms
    }

    pub fn rays(&self) -> &RayBatch<S> {
        &self.rays
    }

    /// Which rays of the previous element's input were blocked by it.
    ///
    /// `None` until a surface has filtered rays. The mask is indexed like
    /// that element's input batch, so it can be longer than [`Self::rays`].
    pub fn blocked(&self) -> Option<&[bool]> {
        self.blocked.as_deref()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked
            .as_ref()
            .map_or(0, |mask| mask.iter().filter(|&&b| b).count())
    }

    /// The whole chain composed into a single transform.
    pub fn forward_kinematic(&self) -> Transform<S> {
        forward_kinematic(self.dim(), &self.transforms)
    }

    /// Origin of the current local frame, in global coordinates.
    pub fn target(&self) -> VectorN<S> {
        self.forward_kinematic()
            .direct_point(&VectorN::zeros(self.dim()))
    }

    /// Same state with a new ray batch.
    pub fn with_rays(mut self, rays: RayBatch<S>) -> Self {
        assert_eq!(rays.dim(), self.dim(), "ray batch dimension mismatch");
        self.rays = rays;
        self
    }

    pub fn with_blocked(mut self, blocked: Vec<bool>) -> Self {
        self.blocked = Some(blocked);
        self
    }

    /// Same state with `transforms` appended to the chain.
    pub fn extend_chain(mut self, transforms: impl IntoIterator<Item = Transform<S>>) -> Self {
        for t in transforms {
            assert_eq!(t.dim(), self.dim(), "transform dimension mismatch");
            self.transforms.push(t);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SimulationState::<f64>::new(Sampling::new::<f64>(3, 4));
        assert_eq!(state.transforms(), &[Transform::identity(3)]);
        assert!(state.rays().is_empty());
        assert!(state.blocked().is_none());
        assert_eq!(state.blocked_count(), 0);
        assert_eq!(state.target(), VectorN::zeros(3));
    }

    #[test]
    fn test_builders() {
        let state = SimulationState::<f64>::new(Sampling::default())
            .extend_chain([Transform::translate(VectorN::new2(2.0, 0.0))])
            .with_blocked(vec![true, false, true]);
        assert_eq!(state.transforms().len(), 2);
        assert_eq!(state.target(), VectorN::new2(2.0, 0.0));
        assert_eq!(state.blocked_count(), 2);
    }

    #[test]
    #[should_panic(expected = "sampling precision")]
    fn test_precision_mismatch() {
        let _ = SimulationState::<f32>::new(Sampling::default());
    }
}
