use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{Backend, Vector};

/// Clamp keeping the cross-entropy logarithms and their gradient finite at 0
/// and 1.
const BCE_EPS: f32 = 1e-7;

/// Where the Huber loss switches from quadratic to linear.
const HUBER_DELTA: f32 = 1.0;

/// Selects the cost the network minimises, and with it the error injected at
/// the output layer when backpropagation starts.
///
/// - `SquaredError`: `½‖o − t‖²`, gradient `o − t`. The default.
/// - `BinaryCrossEntropy`: pair with a Sigmoid output layer.
/// - `Huber`: squared near the target, linear beyond δ = 1.
///
/// Every variant sums over the outputs rather than averaging, so the
/// gradient of one output does not depend on how many outputs there are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    SquaredError,
    BinaryCrossEntropy,
    Huber,
}

impl LossType {
    pub fn loss<B: Backend>(&self, predicted: &Vector<B>, expected: &Vector<B>) -> Result<f32> {
        let diff = predicted.sub(expected)?;
        Ok(match self {
            LossType::SquaredError => 0.5 * diff.dot(&diff)?,
            LossType::BinaryCrossEntropy => predicted
                .with_each(|i| {
                    let (p, y) = (predicted.get(i), expected.get(i));
                    -(y * (p + BCE_EPS).ln() + (1.0 - y) * (1.0 - p + BCE_EPS).ln())
                })
                .sum(),
            LossType::Huber => diff
                .map(|x| {
                    if x.abs() <= HUBER_DELTA {
                        0.5 * x * x
                    } else {
                        HUBER_DELTA * (x.abs() - 0.5 * HUBER_DELTA)
                    }
                })
                .sum(),
        })
    }

    /// ∂Cost/∂output for one example.
    pub fn gradient<B: Backend>(&self, predicted: &Vector<B>, expected: &Vector<B>) -> Result<Vector<B>> {
        let diff = predicted.sub(expected)?;
        Ok(match self {
            LossType::SquaredError => diff,
            LossType::BinaryCrossEntropy => diff.with_each(|i| {
                let p = predicted.get(i);
                diff.get(i) / ((p + BCE_EPS) * (1.0 - p + BCE_EPS))
            }),
            LossType::Huber => diff.map(|x| x.clamp(-HUBER_DELTA, HUBER_DELTA)),
        })
    }
}
