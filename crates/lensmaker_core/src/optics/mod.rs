//! Optical elements: the steps of a sequence.
//!
//! Every element is a pure function from one [`SimulationState`] to the
//! next and owns only its own parameters.

mod gap;
mod optical_surface;
mod source;

pub use gap::Gap;
pub use optical_surface::{Anchor, Interaction, OpticalSurface};
pub use source::{PointSourceAtInfinity, DEFAULT_MARGIN};

use lensmaker_math::Scalar;

use crate::state::SimulationState;

#[derive(Debug, Clone, PartialEq)]
pub enum OpticalElement<S: Scalar> {
    Source(PointSourceAtInfinity<S>),
    Surface(OpticalSurface<S>),
    Gap(Gap<S>),
}

impl<S: Scalar> OpticalElement<S> {
    /// Short name for logs and exported scenes.
    pub fn kind(&self) -> &'static str {
        match self {
            OpticalElement::Source(_) => "source",
            OpticalElement::Surface(_) => "surface",
            OpticalElement::Gap(_) => "gap",
        }
    }

    pub fn forward(&self, input: &SimulationState<S>) -> SimulationState<S> {
        match self {
            OpticalElement::Source(source) => source.forward(input),
            OpticalElement::Surface(surface) => surface.forward(input),
            OpticalElement::Gap(gap) => gap.forward(input),
        }
    }

    pub fn named_parameters(&self) -> Vec<(&'static str, S)> {
        match self {
            OpticalElement::Source(source) => source.named_parameters(),
            OpticalElement::Surface(surface) => surface.named_parameters(),
            OpticalElement::Gap(gap) => gap.named_parameters(),
        }
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut S> {
        match self {
            OpticalElement::Source(source) => source.parameter_mut(name),
            OpticalElement::Surface(surface) => surface.parameter_mut(name),
            OpticalElement::Gap(gap) => gap.parameter_mut(name),
        }
    }
}

impl<S: Scalar> From<PointSourceAtInfinity<S>> for OpticalElement<S> {
    fn from(source: PointSourceAtInfinity<S>) -> Self {
        OpticalElement::Source(source)
    }
}

impl<S: Scalar> From<OpticalSurface<S>> for OpticalElement<S> {
    fn from(surface: OpticalSurface<S>) -> Self {
        OpticalElement::Surface(surface)
    }
}

impl<S: Scalar> From<Gap<S>> for OpticalElement<S> {
    fn from(gap: Gap<S>) -> Self {
        OpticalElement::Gap(gap)
    }
}
