use thiserror::Error;

/// Everything that can go wrong inside the engine.
///
/// None of these are retried internally; the operation that raised them is
/// abandoned and the caller decides what to do.
#[derive(Debug, Error)]
pub enum Error {
    /// Operand lengths or dimensions disagree. Raised before any mutation.
    #[error("shape mismatch in {operation}: expected {expected}, got {actual}")]
    ShapeMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A network, layer or parameter pair was built in an inconsistent state.
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),

    /// The gradient accumulator does not have one entry per layer transition.
    #[error("expected {expected} gradient deltas, got {actual}")]
    GradientCountMismatch { expected: usize, actual: usize },

    /// A classification run predicted the wrong class.
    #[error("expected class {expected}, predicted {actual} (outputs: {outputs:?})")]
    EvaluationMismatch {
        expected: usize,
        actual: usize,
        outputs: Vec<f32>,
    },

    #[error("invalid network spec: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::ShapeMismatch`] unless `expected == actual`.
pub(crate) fn check_len(operation: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            operation,
            expected,
            actual,
        })
    }
}
