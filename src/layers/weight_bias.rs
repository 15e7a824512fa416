use rand::Rng;

use crate::error::{check_len, Error, Result};
use crate::math::{Backend, Matrix, Vector};

/// Parameters of one layer transition.
///
/// `weights` has one column per neuron of the previous layer and one row per
/// neuron of this layer; `biases` has one entry per row.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightBias<B: Backend> {
    weights: Matrix<B>,
    biases: Vector<B>,
}

impl<B: Backend> WeightBias<B> {
    pub fn new(weights: Matrix<B>, biases: Vector<B>) -> Result<Self> {
        if weights.rows() != biases.len() {
            return Err(Error::InvalidConstruction(format!(
                "weight matrix has {} rows but there are {} biases",
                weights.rows(),
                biases.len()
            )));
        }
        Ok(WeightBias { weights, biases })
    }

    pub fn zeros(inputs: usize, outputs: usize) -> Self {
        WeightBias {
            weights: Matrix::zeros(inputs, outputs),
            biases: Vector::zeros(outputs),
        }
    }

    /// Every weight and bias drawn uniformly from `[min, max_exclusive)`.
    pub fn random<R>(inputs: usize, outputs: usize, min: f32, max_exclusive: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut wb = Self::zeros(inputs, outputs);
        wb.weights.fill_with_random_values(min, max_exclusive, rng);
        wb.biases.fill_with_random_values(min, max_exclusive, rng);
        wb
    }

    pub fn weights(&self) -> &Matrix<B> {
        &self.weights
    }

    pub fn biases(&self) -> &Vector<B> {
        &self.biases
    }

    pub fn inputs(&self) -> usize {
        self.weights.cols()
    }

    pub fn outputs(&self) -> usize {
        self.weights.rows()
    }

    /// Number of trainable scalars: every weight plus every bias.
    pub fn parameter_count(&self) -> usize {
        (self.inputs() + 1) * self.outputs()
    }

    /// `weights * activations + biases`.
    pub fn apply(&self, activations: &Vector<B>) -> Result<Vector<B>> {
        self.weights.mult_vector(activations)?.add(&self.biases)
    }

    pub fn add(&mut self, delta: &WeightBias<B>) -> Result<()> {
        self.check_shape("WeightBias::add", delta)?;
        self.weights = self.weights.add(&delta.weights)?;
        self.biases = self.biases.add(&delta.biases)?;
        Ok(())
    }

    pub fn sub(&mut self, delta: &WeightBias<B>) -> Result<()> {
        self.check_shape("WeightBias::sub", delta)?;
        self.weights = self.weights.sub(&delta.weights)?;
        self.biases = self.biases.sub(&delta.biases)?;
        Ok(())
    }

    pub fn scale(&mut self, factor: f32) {
        self.weights = self.weights.scale(factor);
        self.biases = self.biases.scale(factor);
    }

    // Checked up front so a failing `add`/`sub` leaves both halves untouched.
    fn check_shape(&self, operation: &'static str, other: &WeightBias<B>) -> Result<()> {
        check_len(operation, self.inputs(), other.inputs())?;
        check_len(operation, self.outputs(), other.outputs())
    }
}

/// Adds every delta into the matching accumulator entry.
pub fn accumulate<B: Backend>(accumulator: &mut [WeightBias<B>], deltas: &[WeightBias<B>]) -> Result<()> {
    if accumulator.len() != deltas.len() {
        return Err(Error::GradientCountMismatch {
            expected: accumulator.len(),
            actual: deltas.len(),
        });
    }
    for (acc, delta) in accumulator.iter_mut().zip(deltas) {
        acc.add(delta)?;
    }
    Ok(())
}

pub fn scale_all<B: Backend>(weight_biases: &mut [WeightBias<B>], factor: f32) {
    for wb in weight_biases {
        wb.scale(factor);
    }
}
