use crate::math::{Backend, Vector};

/// An input paired with the output the network should produce for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample<B: Backend> {
    pub input: Vector<B>,
    pub target: Vector<B>,
}

impl<B: Backend> TrainingExample<B> {
    pub fn new(input: Vector<B>, target: Vector<B>) -> Self {
        TrainingExample { input, target }
    }

    pub fn from_slices(input: &[f32], target: &[f32]) -> Self {
        Self::new(Vector::of(input), Vector::of(target))
    }
}

/// An input paired with the index of the output neuron that should fire
/// strongest. Used for classification checks.
#[derive(Debug, Clone, PartialEq)]
pub struct TestExample<B: Backend> {
    pub input: Vector<B>,
    pub label: usize,
}

impl<B: Backend> TestExample<B> {
    pub fn new(input: Vector<B>, label: usize) -> Self {
        TestExample { input, label }
    }
}
