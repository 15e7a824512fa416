use std::fmt;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::ActivationFunction;
use crate::error::{check_len, Error, Result};
use crate::layers::weight_bias::{accumulate, scale_all};
use crate::layers::{ComputeLayer, Layer, WeightBias};
use crate::loss::LossType;
use crate::math::{Backend, Vector};
use crate::network::spec::{LayerDefinition, NetworkSpec};
use crate::train::example::{TestExample, TrainingExample};
use crate::train::mini_batch::MiniBatch;

pub const DEFAULT_LEARNING_RATE: f32 = 1.0;
pub const DEFAULT_MINI_BATCH_SIZE: usize = 100;

/// A fully connected feed-forward network.
///
/// Layer 0 is the input layer, the last layer is the output layer. Layer
/// sizes and activation functions are fixed at construction; training only
/// changes weights and biases.
#[derive(Debug, Clone)]
pub struct Brain<B: Backend> {
    layers: Vec<Layer<B>>,
    learning_rate: f32,
    mini_batch_size: usize,
    loss: LossType,
}

impl<B: Backend> Brain<B> {
    /// Builds a randomly initialized network using the thread-local RNG.
    pub fn new(definitions: &[LayerDefinition]) -> Result<Self> {
        Self::with_rng(definitions, &mut rand::thread_rng())
    }

    /// Builds a randomly initialized network, drawing every weight and bias
    /// from `rng`.
    pub fn with_rng<R>(definitions: &[LayerDefinition], rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if definitions.len() < 2 {
            return Err(Error::InvalidConstruction(format!(
                "a network needs at least 2 layers, got {}",
                definitions.len()
            )));
        }
        if let Some(i) = definitions.iter().position(|d| d.size == 0) {
            return Err(Error::InvalidConstruction(format!("layer {i} has no neurons")));
        }

        let mut layers = Vec::with_capacity(definitions.len());
        layers.push(Layer::input(definitions[0].size));
        for pair in definitions.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            layers.push(Layer::Compute(ComputeLayer::random(
                previous.size,
                current.size,
                current.activation,
                rng,
            )));
        }

        debug!(
            "built {} network {:?} with {} parameters",
            B::NAME,
            definitions.iter().map(|d| d.size).collect::<Vec<_>>(),
            parameter_count(&layers)
        );
        Ok(Self::from_layers(layers))
    }

    /// Builds a network from existing parameters. Every transition must take
    /// as many inputs as the previous one produces.
    pub fn from_parameters(parameters: Vec<(WeightBias<B>, ActivationFunction)>) -> Result<Self> {
        let inputs = match parameters.first() {
            Some((wb, _)) => wb.inputs(),
            None => {
                return Err(Error::InvalidConstruction(
                    "a network needs at least one weight transition".to_string(),
                ))
            }
        };

        let mut layers = Vec::with_capacity(parameters.len() + 1);
        layers.push(Layer::input(inputs));
        let mut previous = inputs;
        for (i, (wb, activation)) in parameters.into_iter().enumerate() {
            if wb.inputs() != previous {
                return Err(Error::InvalidConstruction(format!(
                    "layer {i} has {previous} outputs but transition {i} expects {} inputs",
                    wb.inputs()
                )));
            }
            if wb.inputs() == 0 || wb.outputs() == 0 {
                return Err(Error::InvalidConstruction(format!("transition {i} has an empty side")));
            }
            previous = wb.outputs();
            layers.push(Layer::Compute(ComputeLayer::new(wb, activation)));
        }
        Ok(Self::from_layers(layers))
    }

    /// Like [`Brain::from_parameters`] with one activation function for every
    /// layer.
    pub fn from_weight_biases(weight_biases: Vec<WeightBias<B>>, activation: ActivationFunction) -> Result<Self> {
        Self::from_parameters(weight_biases.into_iter().map(|wb| (wb, activation)).collect())
    }

    /// Builds a network from a [`NetworkSpec`] and applies its
    /// hyperparameters. Without a seed, weights come from the thread-local RNG.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Self> {
        let mut brain = match spec.seed {
            Some(seed) => Self::with_rng(&spec.layers, &mut StdRng::seed_from_u64(seed))?,
            None => Self::new(&spec.layers)?,
        };
        brain.set_learning_rate(spec.learning_rate)?;
        brain.set_mini_batch_size(spec.mini_batch_size)?;
        brain.set_loss(spec.loss);
        Ok(brain)
    }

    fn from_layers(layers: Vec<Layer<B>>) -> Self {
        Brain {
            layers,
            learning_rate: DEFAULT_LEARNING_RATE,
            mini_batch_size: DEFAULT_MINI_BATCH_SIZE,
            loss: LossType::default(),
        }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) -> Result<()> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidConstruction(format!(
                "learning rate must be positive, got {learning_rate}"
            )));
        }
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn mini_batch_size(&self) -> usize {
        self.mini_batch_size
    }

    /// Sizes above the training set size mean one batch per training call.
    pub fn set_mini_batch_size(&mut self, mini_batch_size: usize) -> Result<()> {
        if mini_batch_size == 0 {
            return Err(Error::InvalidConstruction("mini-batch size must be at least 1".to_string()));
        }
        self.mini_batch_size = mini_batch_size;
        Ok(())
    }

    pub fn loss(&self) -> LossType {
        self.loss
    }

    pub fn set_loss(&mut self, loss: LossType) {
        self.loss = loss;
    }

    pub fn layers(&self) -> &[Layer<B>] {
        &self.layers
    }

    pub fn layer(&self, i: usize) -> Option<&Layer<B>> {
        self.layers.get(i)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].size()
    }

    pub fn output_size(&self) -> usize {
        self.output_layer().size()
    }

    pub fn input_layer(&self) -> &Layer<B> {
        &self.layers[0]
    }

    pub fn output_layer(&self) -> &Layer<B> {
        &self.layers[self.layers.len() - 1]
    }

    /// Every weight and bias in the network.
    pub fn parameter_count(&self) -> usize {
        parameter_count(&self.layers)
    }

    /// Runs a forward pass and returns the output layer's activations.
    ///
    /// The returned vector is the output layer's own buffer; it is
    /// overwritten by the next prediction.
    pub fn predict(&mut self, input: &Vector<B>) -> Result<&Vector<B>> {
        check_len("Brain::predict", self.input_size(), input.len())?;
        self.layers[0].set_input(input)?;
        for i in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            done[i - 1].feedforward(&mut rest[0])?;
        }
        Ok(self.output_layer().activations())
    }

    pub fn predict_slice(&mut self, input: &[f32]) -> Result<&Vector<B>> {
        self.predict(&Vector::of(input))
    }

    /// Gradient of the loss for one example, one delta per layer transition
    /// in transition order.
    pub fn backpropagate(&mut self, example: &TrainingExample<B>) -> Result<Vec<WeightBias<B>>> {
        self.backpropagate_with_loss(example).map(|(deltas, _)| deltas)
    }

    fn backpropagate_with_loss(&mut self, example: &TrainingExample<B>) -> Result<(Vec<WeightBias<B>>, f32)> {
        let loss = self.loss;
        let output = self.predict(&example.input)?;
        let cost = loss.loss(output, &example.target)?;
        let mut error = loss.gradient(output, &example.target)?;

        let mut deltas = Vec::with_capacity(self.layers.len() - 1);
        for i in (1..self.layers.len()).rev() {
            let layer = self.compute_layer(i)?;
            let previous = self.layers[i - 1].activations();

            let nabla_biases = layer.nabla_biases(&error)?;
            let nabla_weights = nabla_biases.outer(previous);

            // The error for the previous layer's outputs only matters if that
            // layer has parameters of its own.
            if i > 1 {
                error = layer.weights().transpose().mult_vector(&nabla_biases)?;
            }
            deltas.push(WeightBias::new(nabla_weights, nabla_biases)?);
        }
        deltas.reverse();
        Ok((deltas, cost))
    }

    /// One epoch of mini-batch gradient descent over `examples`.
    pub fn train<R>(&mut self, examples: &[TrainingExample<B>], rng: &mut R) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        self.train_epoch(examples, rng).map(|_| ())
    }

    /// Same as [`Brain::train`], returning the mean loss the examples had
    /// when they were backpropagated.
    pub fn train_epoch<R>(&mut self, examples: &[TrainingExample<B>], rng: &mut R) -> Result<f32>
    where
        R: Rng + ?Sized,
    {
        // Reject bad data before the first batch touches any weight.
        for example in examples {
            check_len("Brain::train (input)", self.input_size(), example.input.len())?;
            check_len("Brain::train (target)", self.output_size(), example.target.len())?;
        }

        let batches = MiniBatch::shuffle_and_chop(self.mini_batch_size, examples, rng)?;
        let mut total_loss = 0.0;

        for (index, batch) in batches.iter().enumerate() {
            let mut step = self.zero_gradients();
            for example in batch.iter() {
                let (deltas, cost) = self.backpropagate_with_loss(example)?;
                accumulate(&mut step, &deltas)?;
                total_loss += cost;
            }

            // Average over the batch and apply the learning rate in one pass.
            scale_all(&mut step, self.learning_rate / batch.len() as f32);
            self.sub(&step)?;
            trace!("applied mini-batch {}/{} ({} examples)", index + 1, batches.len(), batch.len());
        }

        let mean_loss = if examples.is_empty() {
            0.0
        } else {
            total_loss / examples.len() as f32
        };
        debug!(
            "trained on {} examples in {} mini-batches, mean loss {mean_loss}",
            examples.len(),
            batches.len()
        );
        Ok(mean_loss)
    }

    /// Adds one delta to every layer transition.
    pub fn add(&mut self, deltas: &[WeightBias<B>]) -> Result<()> {
        self.check_gradients(deltas)?;
        for (layer, delta) in self.compute_layers_mut().zip(deltas) {
            layer.add(delta)?;
        }
        Ok(())
    }

    /// Subtracts one delta from every layer transition: the descent step.
    pub fn sub(&mut self, deltas: &[WeightBias<B>]) -> Result<()> {
        self.check_gradients(deltas)?;
        for (layer, delta) in self.compute_layers_mut().zip(deltas) {
            layer.sub(delta)?;
        }
        Ok(())
    }

    /// Mean loss over `examples`, without touching the parameters.
    pub fn cost(&mut self, examples: &[TrainingExample<B>]) -> Result<f32> {
        if examples.is_empty() {
            return Ok(0.0);
        }
        let loss = self.loss;
        let mut total = 0.0;
        for example in examples {
            let output = self.predict(&example.input)?;
            total += loss.loss(output, &example.target)?;
        }
        Ok(total / examples.len() as f32)
    }

    /// Fails on the first example whose strongest output is not its label.
    pub fn test(&mut self, examples: &[TestExample<B>]) -> Result<()> {
        for example in examples {
            let output = self.predict(&example.input)?;
            let actual = argmax(output);
            if actual != example.label {
                return Err(Error::EvaluationMismatch {
                    expected: example.label,
                    actual,
                    outputs: output.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Fraction of `examples` whose strongest output matches the label.
    pub fn accuracy(&mut self, examples: &[TestExample<B>]) -> Result<f32> {
        if examples.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0;
        for example in examples {
            if argmax(self.predict(&example.input)?) == example.label {
                correct += 1;
            }
        }
        Ok(correct as f32 / examples.len() as f32)
    }

    fn zero_gradients(&self) -> Vec<WeightBias<B>> {
        self.layers
            .iter()
            .filter_map(Layer::weight_bias)
            .map(|wb| WeightBias::zeros(wb.inputs(), wb.outputs()))
            .collect()
    }

    fn check_gradients(&self, deltas: &[WeightBias<B>]) -> Result<()> {
        let expected = self.layers.len() - 1;
        if deltas.len() != expected {
            return Err(Error::GradientCountMismatch {
                expected,
                actual: deltas.len(),
            });
        }
        // Validate every shape before the first layer changes.
        for (layer, delta) in self.layers.iter().filter_map(Layer::weight_bias).zip(deltas) {
            check_len("Brain::step (inputs)", layer.inputs(), delta.inputs())?;
            check_len("Brain::step (outputs)", layer.outputs(), delta.outputs())?;
        }
        Ok(())
    }

    fn compute_layer(&self, i: usize) -> Result<&ComputeLayer<B>> {
        self.layers[i]
            .as_compute()
            .ok_or_else(|| Error::InvalidConstruction(format!("layer {i} has no parameters")))
    }

    fn compute_layers_mut(&mut self) -> impl Iterator<Item = &mut ComputeLayer<B>> {
        self.layers.iter_mut().filter_map(Layer::as_compute_mut)
    }

    fn max_layer_size(&self) -> usize {
        self.layers.iter().map(Layer::size).max().unwrap_or(0)
    }
}

fn parameter_count<B: Backend>(layers: &[Layer<B>]) -> usize {
    layers
        .iter()
        .filter_map(Layer::weight_bias)
        .map(WeightBias::parameter_count)
        .sum()
}

fn argmax<B: Backend>(output: &Vector<B>) -> usize {
    output.argmax().unwrap_or(0)
}

/// Prints the last activations, one column per layer; `#` pads short layers.
impl<B: Backend> fmt::Display for Brain<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for j in 0..self.max_layer_size() {
            for layer in &self.layers {
                if j < layer.size() {
                    write!(f, "{}\t", layer.activations().get(j))?;
                } else {
                    write!(f, "#\t")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
