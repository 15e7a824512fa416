use serde::{Deserialize, Serialize};

/// Slope of [`ActivationFunction::LeakyReLU`] at and below zero.
pub const LEAKY_SLOPE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Linear,
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
    /// Passes positive inputs through and scales the rest by [`LEAKY_SLOPE`].
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
    /// `e^x - 1` below zero, identity above.
    Elu,
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 6] = [
        ActivationFunction::Linear,
        ActivationFunction::Sigmoid,
        ActivationFunction::Tanh,
        ActivationFunction::ReLU,
        ActivationFunction::LeakyReLU,
        ActivationFunction::Elu,
    ];

    pub fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::LeakyReLU => if x > 0.0 { x } else { LEAKY_SLOPE * x },
            ActivationFunction::Elu => if x < 0.0 { x.exp() - 1.0 } else { x },
        }
    }

    /// Derivative with respect to the pre-activation `x`.
    ///
    /// At the kink, ReLU uses 0 and LeakyReLU uses its negative-side slope.
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Linear => 1.0,
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU => if x > 0.0 { 1.0 } else { LEAKY_SLOPE },
            ActivationFunction::Elu => if x < 0.0 { x.exp() } else { 1.0 },
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_derivative_matches_finite_difference() {
        let f = ActivationFunction::Sigmoid;
        let eps = 1e-3;
        for &x in &[-4.0, -1.5, -0.3, 0.0, 0.7, 2.0, 5.0] {
            let numeric = (f.apply(x + eps) - f.apply(x)) / eps;
            assert!(
                (numeric - f.derivative(x)).abs() < 1e-2,
                "x = {x}: numeric {numeric}, analytic {}",
                f.derivative(x)
            );
        }
    }

    #[test]
    fn smooth_derivatives_match_finite_difference() {
        let eps = 1e-3;
        for f in ActivationFunction::ALL {
            // stay clear of the kink at zero
            for &x in &[-2.0, -0.5, 0.5, 2.0] {
                let numeric = (f.apply(x + eps) - f.apply(x - eps)) / (2.0 * eps);
                assert!((numeric - f.derivative(x)).abs() < 1e-2, "{f:?} at {x}");
            }
        }
    }

    #[test]
    fn kink_conventions() {
        assert_eq!(ActivationFunction::ReLU.derivative(0.0), 0.0);
        assert_eq!(ActivationFunction::LeakyReLU.derivative(0.0), 0.5);
        assert_eq!(ActivationFunction::LeakyReLU.apply(-2.0), -1.0);
        assert_eq!(ActivationFunction::Elu.derivative(0.0), 1.0);
        assert_eq!(ActivationFunction::Elu.apply(0.0), 0.0);
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&ActivationFunction::LeakyReLU).unwrap();
        assert_eq!(json, "\"leaky_relu\"");
        let back: ActivationFunction = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(back, ActivationFunction::ReLU);
    }
}
