pub mod epoch_stats;
pub mod example;
pub mod loop_fn;
pub mod mini_batch;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use example::{TestExample, TrainingExample};
pub use loop_fn::train_loop;
pub use mini_batch::MiniBatch;
pub use train_config::TrainConfig;
