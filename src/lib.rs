pub mod activation;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::ActivationFunction;
pub use error::{Error, Result};
pub use layers::{ComputeLayer, Layer, WeightBias};
pub use loss::LossType;
pub use math::{Backend, Cpu, Matrix, Vector};
#[cfg(feature = "native")]
pub use math::Native;
pub use network::{Brain, LayerDefinition, NetworkSpec};
pub use train::{train_loop, EpochStats, MiniBatch, TestExample, TrainConfig, TrainingExample};
