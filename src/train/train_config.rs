use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// Batch size, learning rate and loss live on the `Brain` itself; this only
/// controls how long the loop runs and who hears about it.
///
/// # Fields
/// - `epochs`: upper bound on full passes over the training data
/// - `target_loss`: stop once an epoch's mean loss falls below this
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///   completed epoch. If the receiver is dropped the loop
///   terminates early.
/// - `stop_flag`: optional atomic flag; when set to `true` from another
///   thread the loop terminates after the current epoch.
#[derive(Debug, Default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub target_loss: Option<f32>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no early stopping, no progress
    /// channel and no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            ..Default::default()
        }
    }

    pub fn with_target_loss(mut self, target_loss: f32) -> Self {
        self.target_loss = Some(target_loss);
        self
    }

    pub fn with_progress(mut self, progress_tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(stop_flag);
        self
    }
}
