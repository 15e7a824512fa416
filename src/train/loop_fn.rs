use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info};
use rand::Rng;

use crate::error::Result;
use crate::math::Backend;
use crate::network::Brain;
use crate::train::epoch_stats::EpochStats;
use crate::train::example::TrainingExample;
use crate::train::train_config::TrainConfig;

/// Trains `brain` for up to `config.epochs` epochs and returns the mean
/// training loss of the last completed epoch (`0.0` if none ran).
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`, **or**
/// - an epoch's loss falls below `config.target_loss`.
///
/// # Errors
/// Any error from [`Brain::train_epoch`] aborts the run; epochs that already
/// finished keep their updates.
pub fn train_loop<B, R>(
    brain: &mut Brain<B>,
    examples: &[TrainingExample<B>],
    config: &TrainConfig,
    rng: &mut R,
) -> Result<f32>
where
    B: Backend,
    R: Rng + ?Sized,
{
    let mut last_train_loss = 0.0;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            info!("stop requested before epoch {epoch}");
            break;
        }

        let t_start = Instant::now();
        let train_loss = brain.train_epoch(examples, rng)?;
        last_train_loss = train_loss;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        debug!("epoch {epoch}/{}: loss {train_loss:.6} ({elapsed_ms} ms)", config.epochs);

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                info!("progress receiver dropped after epoch {epoch}");
                break;
            }
        }

        if let Some(target) = config.target_loss {
            if train_loss < target {
                info!("reached target loss {target} after epoch {epoch}");
                break;
            }
        }

        if stop_requested(config) {
            info!("stop requested after epoch {epoch}");
            break;
        }
    }

    Ok(last_train_loss)
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}
