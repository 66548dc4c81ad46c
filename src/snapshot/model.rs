//! Model snapshot capability and serializable state

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model metadata carried into the full-model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model architecture type (e.g., "mlp", "transformer", "custom")
    pub architecture: String,

    /// Model version
    pub version: String,

    /// Custom metadata fields
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: "0.1.0".to_string(),
            custom: HashMap::new(),
        }
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// A named parameter tensor extracted from a model
#[derive(Debug, Clone, PartialEq)]
pub struct TensorData {
    /// Parameter name (e.g., "layer1.weight", "bias")
    pub name: String,

    /// Tensor shape
    pub shape: Vec<usize>,

    /// Row-major f32 values
    pub data: Vec<f32>,
}

impl TensorData {
    /// Create a named tensor
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self { name: name.into(), shape, data }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Information about one parameter in a serialized snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,

    /// Data type (currently always "f32")
    pub dtype: String,
}

/// Serializable full-model state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Parameter information
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

/// Capability a model exposes to the monitor: enough identity for a full
/// serializable snapshot, and the current trainable-parameter state.
///
/// The monitor never interprets parameters; it only requests their
/// persistence. Implement this on whatever owns the weights.
pub trait Snapshot {
    /// Model identity for the full-model artifact
    fn metadata(&self) -> ModelMetadata;

    /// Current trainable-parameter state
    fn parameters(&self) -> Vec<TensorData>;

    /// Full serializable snapshot (metadata + parameters)
    fn to_state(&self) -> ModelState {
        let tensors = self.parameters();
        let mut data = Vec::new();
        let parameters: Vec<ParameterInfo> = tensors
            .iter()
            .map(|t| {
                data.extend_from_slice(&t.data);
                ParameterInfo {
                    name: t.name.clone(),
                    shape: t.shape.clone(),
                    dtype: "f32".to_string(),
                }
            })
            .collect();

        ModelState { metadata: self.metadata(), parameters, data }
    }
}

/// Named-parameter container, a ready-made implementation of [`Snapshot`]
///
/// Not a model architecture: just the parameter state an external training
/// loop hands to the monitor.
#[derive(Debug, Clone)]
pub struct Model {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Model parameters
    pub parameters: Vec<TensorData>,
}

impl Model {
    /// Create a new model
    pub fn new(metadata: ModelMetadata, parameters: Vec<TensorData>) -> Self {
        Self { metadata, parameters }
    }

    /// Get parameter by name
    pub fn get_parameter(&self, name: &str) -> Option<&TensorData> {
        self.parameters.iter().find(|t| t.name == name)
    }

    /// Get mutable parameter by name
    pub fn get_parameter_mut(&mut self, name: &str) -> Option<&mut TensorData> {
        self.parameters.iter_mut().find(|t| t.name == name)
    }

    /// Create model from serialized state
    pub fn from_state(state: ModelState) -> Self {
        let mut data_offset = 0;
        let parameters: Vec<TensorData> = state
            .parameters
            .into_iter()
            .map(|info| {
                let size: usize = info.shape.iter().product();
                let data = state.data[data_offset..data_offset + size].to_vec();
                data_offset += size;
                TensorData::new(info.name, info.shape, data)
            })
            .collect();

        Self { metadata: state.metadata, parameters }
    }
}

impl Snapshot for Model {
    fn metadata(&self) -> ModelMetadata {
        self.metadata.clone()
    }

    fn parameters(&self) -> Vec<TensorData> {
        self.parameters.clone()
    }
}
