//! Free space between elements.

use lensmaker_math::{Scalar, Transform, VectorN};

use crate::error::{check_finite, TraceResult};
use crate::state::SimulationState;

/// Moves the chain along the principal axis. Rays are not touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap<S: Scalar> {
    offset: S,
}

impl<S: Scalar> Gap<S> {
    pub fn new(offset: S) -> TraceResult<Self> {
        check_finite("gap offset", offset.value())?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> S {
        self.offset
    }

    pub fn forward(&self, input: &SimulationState<S>) -> SimulationState<S> {
        let translate = Transform::translate(VectorN::along_x(input.dim(), self.offset));
        input.clone().extend_chain([translate])
    }

    pub fn named_parameters(&self) -> Vec<(&'static str, S)> {
        vec![("offset", self.offset)]
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut S> {
        (name == "offset").then_some(&mut self.offset)
    }
}
