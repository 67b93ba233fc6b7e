//! ONNX Runtime decision model.
//!
//! Runs a linear classifier exported to ONNX (e.g. by skl2onnx) over the
//! dense TF-IDF vector. The model must take a single `[1, dim]` float input;
//! the margin is read from the last value of the first row of the chosen
//! output, which covers both `[1, 1]` margins and `[1, 2]` per-class scores.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use spamgate_core::{DecisionModel, ModelError};
use tracing::info;

use crate::features::SparseVector;

pub struct OnnxModel {
    session: Mutex<Session>,
    input: String,
    output: String,
    dim: usize,
}

impl OnnxModel {
    /// Load `model.onnx`. `output` selects the score output by name; the
    /// last declared output is used when `None`.
    pub fn load(model_path: &Path, dim: usize, output: Option<&str>) -> anyhow::Result<Self> {
        anyhow::ensure!(model_path.exists(), "ONNX model not found: {model_path:?}");
        anyhow::ensure!(dim > 0, "feature dimension must be positive");

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| anyhow::anyhow!("ONNX model declares no inputs"))?;
        let output = match output {
            Some(name) => {
                anyhow::ensure!(
                    session.outputs().iter().any(|o| o.name() == name),
                    "ONNX model has no output named {name:?}"
                );
                name.to_string()
            }
            None => session
                .outputs()
                .last()
                .map(|o| o.name().to_string())
                .ok_or_else(|| anyhow::anyhow!("ONNX model declares no outputs"))?,
        };

        info!(model = %model_path.display(), %input, %output, dim, "loaded ONNX decision model");
        Ok(Self {
            session: Mutex::new(session),
            input,
            output,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl DecisionModel<SparseVector> for OnnxModel {
    fn decision_function(&self, features: &SparseVector) -> Result<f64, ModelError> {
        if features.dim() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                actual: features.dim(),
            });
        }

        let dense = features.to_dense_f32();
        let tensor = Tensor::from_array(([1i64, self.dim as i64], dense.into_boxed_slice()))
            .map_err(backend)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Backend("ONNX session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![self.input.as_str() => tensor])
            .map_err(backend)?;

        let (output_shape, data) = outputs[self.output.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(backend)?;
        margin_from_output(output_shape, data)
    }
}

/// Last value of the first row of an output tensor.
fn margin_from_output(dims: &[i64], data: &[f32]) -> Result<f64, ModelError> {
    let row_len = dims
        .last()
        .filter(|&&d| d > 0)
        .map(|&d| d as usize)
        .unwrap_or(data.len());
    data.get(..row_len)
        .and_then(|row| row.last())
        .map(|&m| f64::from(m))
        .ok_or_else(|| ModelError::Backend("ONNX model returned an empty output".into()))
}

fn backend(e: ort::Error) -> ModelError {
    ModelError::Backend(e.to_string())
}
