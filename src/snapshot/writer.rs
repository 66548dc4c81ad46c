//! Snapshot persistence — two artifacts per save event
//!
//! Each save writes a parameters-only file (SafeTensors) and a full-model
//! file (JSON `ModelState`), both named with the configured run suffix.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use safetensors::tensor::{Dtype, TensorView};

use super::model::Snapshot;
use crate::{Error, Result};

/// Writes the on-disk artifacts for a model snapshot
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    /// Directory artifacts are written to
    output_dir: PathBuf,
    /// Suffix appended to artifact names to distinguish runs
    suffix: String,
}

impl SnapshotWriter {
    /// Create a writer for the given directory and run suffix
    pub fn new(output_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self { output_dir: output_dir.into(), suffix: suffix.into() }
    }

    /// Directory artifacts are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the parameters-only artifact
    pub fn parameters_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name("checkpoint", "safetensors"))
    }

    /// Path of the full-model artifact
    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name("model", "json"))
    }

    fn file_name(&self, stem: &str, ext: &str) -> String {
        if self.suffix.is_empty() {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}_{}.{ext}", self.suffix)
        }
    }

    /// Persist both artifacts for the given snapshot
    ///
    /// Creates the output directory if missing. Any I/O or serialization
    /// failure propagates without touching monitor state.
    pub fn write(&self, model: &dyn Snapshot) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        self.write_parameters(model)?;
        self.write_model(model)?;
        Ok(())
    }

    /// Save current parameters as SafeTensors
    fn write_parameters(&self, model: &dyn Snapshot) -> Result<()> {
        let tensors = model.parameters();

        let tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = tensors
            .iter()
            .map(|t| {
                let bytes: Vec<u8> = bytemuck::cast_slice(&t.data).to_vec();
                (t.name.clone(), bytes, t.shape.clone())
            })
            .collect();

        let views: Vec<(&str, TensorView<'_>)> = tensor_data
            .iter()
            .map(|(name, bytes, shape)| {
                let view = TensorView::new(Dtype::F32, shape.clone(), bytes)
                    .map_err(|e| Error::Serialization(format!("tensor view for {name}: {e}")))?;
                Ok((name.as_str(), view))
            })
            .collect::<Result<_>>()?;

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), "vigilar-checkpoint".to_string());

        let safetensor_bytes = safetensors::serialize(views, &Some(metadata))
            .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))?;

        fs::write(self.parameters_path(), safetensor_bytes)?;
        Ok(())
    }

    /// Save the full model state as JSON
    fn write_model(&self, model: &dyn Snapshot) -> Result<()> {
        let state = model.to_state();
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
        fs::write(self.model_path(), json)?;
        Ok(())
    }
}
