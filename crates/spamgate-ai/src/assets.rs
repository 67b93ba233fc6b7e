//! One-shot loading of the fitted vectorizer and model from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use spamgate_core::{Pipeline, Settings, Threshold};
use thiserror::Error;
use tracing::info;

use crate::linear::LinearModel;
use crate::tfidf::TfidfVectorizer;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model expects {model_dim} features but the vectorizer produces {vectorizer_dim}")]
    Incompatible {
        model_dim: usize,
        vectorizer_dim: usize,
    },
}

/// The fitted vectorizer/model pair, loaded once per process.
#[derive(Debug)]
pub struct Assets {
    pub vectorizer: TfidfVectorizer,
    pub model: LinearModel,
}

/// What was loaded, for the `info` command and startup logs.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub vocabulary_len: usize,
    pub dim: usize,
    pub ngram_range: (usize, usize),
    pub intercept: f64,
    pub classes: Option<Vec<String>>,
}

impl Assets {
    /// Read and validate both asset files.
    ///
    /// Fails if either file is missing, unreadable, malformed, or if the
    /// model's feature count disagrees with the vectorizer's.
    pub fn load(model_path: &Path, vectorizer_path: &Path) -> Result<Self, AssetError> {
        let vectorizer: TfidfVectorizer = read_json(vectorizer_path)?;
        let model: LinearModel = read_json(model_path)?;

        if model.dim() != vectorizer.dim() {
            return Err(AssetError::Incompatible {
                model_dim: model.dim(),
                vectorizer_dim: vectorizer.dim(),
            });
        }

        info!(
            model = %model_path.display(),
            vectorizer = %vectorizer_path.display(),
            vocabulary = vectorizer.vocabulary_len(),
            dim = vectorizer.dim(),
            "loaded model assets"
        );
        Ok(Self { vectorizer, model })
    }

    /// Load the assets named in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, AssetError> {
        Self::load(&settings.model_path, &settings.vectorizer_path)
    }

    pub fn summary(&self) -> AssetSummary {
        AssetSummary {
            vocabulary_len: self.vectorizer.vocabulary_len(),
            dim: self.vectorizer.dim(),
            ngram_range: self.vectorizer.ngram_range(),
            intercept: self.model.intercept(),
            classes: self.model.classes().map(|c| c.to_vec()),
        }
    }

    pub fn into_pipeline(self, threshold: Threshold) -> Pipeline<TfidfVectorizer, LinearModel> {
        Pipeline::new(self.vectorizer, self.model, threshold)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| AssetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
