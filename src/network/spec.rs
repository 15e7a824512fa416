use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::error::Result;
use crate::loss::LossType;

/// One layer of a network: how many neurons, and what they apply to their
/// weighted input. The first definition describes the input layer, whose
/// activation function is never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub size: usize,
    pub activation: ActivationFunction,
}

impl LayerDefinition {
    pub fn new(size: usize, activation: ActivationFunction) -> Self {
        LayerDefinition { size, activation }
    }
}

fn default_learning_rate() -> f32 {
    1.0
}

fn default_mini_batch_size() -> usize {
    100
}

/// A serializable description of a network architecture plus the
/// hyperparameters it is trained with.
///
/// Only the shape of the network is described; trained weights are not
/// stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, also used as the file stem.
    pub name: String,
    /// Ordered layer descriptions, input first.
    pub layers: Vec<LayerDefinition>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    #[serde(default = "default_mini_batch_size")]
    pub mini_batch_size: usize,
    #[serde(default)]
    pub loss: LossType,
    /// Seeds weight initialization when present.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn new(name: impl Into<String>, layers: Vec<LayerDefinition>) -> Self {
        NetworkSpec {
            name: name.into(),
            layers,
            learning_rate: default_learning_rate(),
            mini_batch_size: default_mini_batch_size(),
            loss: LossType::default(),
            seed: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<NetworkSpec> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
