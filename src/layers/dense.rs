use rand::Rng;

use crate::activation::ActivationFunction;
use crate::error::{check_len, Error, Result};
use crate::layers::weight_bias::WeightBias;
use crate::math::{Backend, Matrix, Vector};

/// A fully connected layer: parameters for the transition into it, plus the
/// buffers the last forward pass wrote.
///
/// `activations_linear` and `activations` start as zeros and are overwritten
/// (never reallocated) by every forward pass.
#[derive(Debug, Clone)]
pub struct ComputeLayer<B: Backend> {
    weight_bias: WeightBias<B>,
    activations_linear: Vector<B>,
    activations: Vector<B>,
    activation_function: ActivationFunction,
}

/// One layer of neurons. The input layer has no predecessor and therefore no
/// parameters.
#[derive(Debug, Clone)]
pub enum Layer<B: Backend> {
    Input { activations: Vector<B> },
    Compute(ComputeLayer<B>),
}

impl<B: Backend> ComputeLayer<B> {
    pub fn new(weight_bias: WeightBias<B>, activation_function: ActivationFunction) -> Self {
        let size = weight_bias.outputs();
        ComputeLayer {
            weight_bias,
            activations_linear: Vector::zeros(size),
            activations: Vector::zeros(size),
            activation_function,
        }
    }

    /// Glorot-style uniform initialization in `[-b, b)` with
    /// `b = sqrt(6) / sqrt(fan_in + fan_out)`.
    pub fn random<R>(inputs: usize, size: usize, activation_function: ActivationFunction, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let bound = (6.0_f32).sqrt() / ((inputs + size) as f32).sqrt();
        Self::new(WeightBias::random(inputs, size, -bound, bound, rng), activation_function)
    }

    pub fn size(&self) -> usize {
        self.activations.len()
    }

    pub fn weight_bias(&self) -> &WeightBias<B> {
        &self.weight_bias
    }

    pub fn weights(&self) -> &Matrix<B> {
        self.weight_bias.weights()
    }

    pub fn biases(&self) -> &Vector<B> {
        self.weight_bias.biases()
    }

    pub fn activations(&self) -> &Vector<B> {
        &self.activations
    }

    pub fn activations_linear(&self) -> &Vector<B> {
        &self.activations_linear
    }

    pub fn activation_function(&self) -> ActivationFunction {
        self.activation_function
    }

    /// Runs the transition from `previous` activations and stores both the
    /// linear and the activated result.
    pub fn activate(&mut self, previous: &Vector<B>) -> Result<()> {
        let z = self.weight_bias.apply(previous)?;
        let f = self.activation_function;
        self.activations_linear.set_all(&z)?;
        self.activations.set_all(&z.map(|x| f.apply(x)))
    }

    /// Bias gradient for this layer given `error`, the derivative of the cost
    /// with respect to this layer's outputs: `error[i] * f'(z[i])`.
    pub fn nabla_biases(&self, error: &Vector<B>) -> Result<Vector<B>> {
        check_len("ComputeLayer::nabla_biases", self.size(), error.len())?;
        let f = self.activation_function;
        let z = &self.activations_linear;
        Ok(z.with_each(|i| error.get(i) * f.derivative(z.get(i))))
    }

    pub fn add(&mut self, delta: &WeightBias<B>) -> Result<()> {
        self.weight_bias.add(delta)
    }

    pub fn sub(&mut self, delta: &WeightBias<B>) -> Result<()> {
        self.weight_bias.sub(delta)
    }
}

impl<B: Backend> Layer<B> {
    pub fn input(size: usize) -> Self {
        Layer::Input {
            activations: Vector::zeros(size),
        }
    }

    pub fn size(&self) -> usize {
        self.activations().len()
    }

    pub fn activations(&self) -> &Vector<B> {
        match self {
            Layer::Input { activations } => activations,
            Layer::Compute(layer) => layer.activations(),
        }
    }

    /// The input layer passes its values through unchanged.
    pub fn activation_function(&self) -> ActivationFunction {
        match self {
            Layer::Input { .. } => ActivationFunction::Linear,
            Layer::Compute(layer) => layer.activation_function(),
        }
    }

    pub fn weight_bias(&self) -> Option<&WeightBias<B>> {
        self.as_compute().map(ComputeLayer::weight_bias)
    }

    pub fn as_compute(&self) -> Option<&ComputeLayer<B>> {
        match self {
            Layer::Input { .. } => None,
            Layer::Compute(layer) => Some(layer),
        }
    }

    pub fn as_compute_mut(&mut self) -> Option<&mut ComputeLayer<B>> {
        match self {
            Layer::Input { .. } => None,
            Layer::Compute(layer) => Some(layer),
        }
    }

    /// Copies external values into an input layer.
    pub fn set_input(&mut self, input: &Vector<B>) -> Result<()> {
        match self {
            Layer::Input { activations } => activations.set_all(input),
            Layer::Compute(_) => Err(Error::InvalidConstruction(
                "only the input layer takes external values".to_string(),
            )),
        }
    }

    /// Feeds this layer's activations into `next`.
    pub fn feedforward(&self, next: &mut Layer<B>) -> Result<()> {
        match next {
            Layer::Compute(next) => next.activate(self.activations()),
            Layer::Input { .. } => Err(Error::InvalidConstruction(
                "an input layer cannot follow another layer".to_string(),
            )),
        }
    }
}
