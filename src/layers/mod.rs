pub mod dense;
pub mod weight_bias;

pub use dense::{ComputeLayer, Layer};
pub use weight_bias::WeightBias;
