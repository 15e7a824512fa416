use serde::{Deserialize, Serialize};

/// What one finished epoch of [`train_loop`](crate::train::train_loop)
/// reports on the progress channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// Counts from 1.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean loss of the examples as they were backpropagated this epoch.
    pub train_loss: f32,
    pub elapsed_ms: u64,
}
