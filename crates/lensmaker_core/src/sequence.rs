//! Sequential execution of optical elements.

use lensmaker_math::Scalar;

use crate::error::{TraceError, TraceResult};
use crate::optics::OpticalElement;
use crate::sampling::Sampling;
use crate::state::SimulationState;

/// One recorded step of a [`Sequence::full_forward`] run.
#[derive(Debug, Clone)]
pub struct ExecutionStep<'a, S: Scalar> {
    pub element: &'a OpticalElement<S>,
    pub inputs: SimulationState<S>,
    pub outputs: SimulationState<S>,
}

/// An ordered list of optical elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<S: Scalar> {
    elements: Vec<OpticalElement<S>>,
}

impl<S: Scalar> Default for Sequence<S> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<S: Scalar> Sequence<S> {
    pub fn new(elements: Vec<OpticalElement<S>>) -> Self {
        Self { elements }
    }

    /// Append an element.
    pub fn push(&mut self, element: impl Into<OpticalElement<S>>) {
        self.elements.push(element.into());
    }

    pub fn elements(&self) -> &[OpticalElement<S>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Thread `input` through every element in order.
    pub fn forward(&self, input: SimulationState<S>) -> SimulationState<S> {
        self.elements
            .iter()
            .fold(input, |state, element| element.forward(&state))
    }

    /// Run from a fresh state for `sampling`.
    pub fn trace(&self, sampling: Sampling) -> SimulationState<S> {
        self.forward(SimulationState::new(sampling))
    }

    /// Like [`Self::forward`], also recording every step in order.
    pub fn full_forward(
        &self,
        input: SimulationState<S>,
    ) -> (SimulationState<S>, Vec<ExecutionStep<'_, S>>) {
        let mut steps = Vec::with_capacity(self.elements.len());
        let mut state = input;

        for (i, element) in self.elements.iter().enumerate() {
            let outputs = element.forward(&state);
            log::debug!(
                "step {i} ({}): {} -> {} rays",
                element.kind(),
                state.rays().len(),
                outputs.rays().len()
            );
            steps.push(ExecutionStep {
                element,
                inputs: state,
                outputs: outputs.clone(),
            });
            state = outputs;
        }

        (state, steps)
    }

    /// Tunable parameters of every element, named `"<index>.<name>"`.
    pub fn named_parameters(&self) -> Vec<(String, S)> {
        self.elements
            .iter()
            .enumerate()
            .flat_map(|(i, element)| {
                element
                    .named_parameters()
                    .into_iter()
                    .map(move |(name, value)| (format!("{i}.{name}"), value))
            })
            .collect()
    }

    /// Write one parameter by its `"<index>.<name>"` name.
    pub fn set_parameter(&mut self, name: &str, value: S) -> TraceResult<()> {
        let unknown = || TraceError::UnknownParameter(name.to_string());

        let (index, param) = name.split_once('.').ok_or_else(unknown)?;
        let index: usize = index.parse().map_err(|_| unknown())?;
        let slot = self
            .elements
            .get_mut(index)
            .and_then(|element| element.parameter_mut(param))
            .ok_or_else(unknown)?;
        *slot = value;
        Ok(())
    }
}
