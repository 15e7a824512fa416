pub mod brain;
pub mod spec;

pub use brain::Brain;
pub use spec::{LayerDefinition, NetworkSpec};
