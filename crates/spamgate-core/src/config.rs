//! Startup configuration: asset locations and the spam threshold.
//!
//! Everything here is fixed once the process has started. The CLI builds a
//! [`Settings`] from its flags and hands the pieces to the asset loader and
//! the [`Pipeline`](crate::Pipeline).

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Cutoff on sigmoid(decision score) at or above which text is spam.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

pub const DEFAULT_MODEL_PATH: &str = "Model/best_model_svc.json";
pub const DEFAULT_VECTORIZER_PATH: &str = "Model/tfidf_vectorizer.json";

/// A spam threshold, guaranteed to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        // NaN fails the range check too.
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::ThresholdOutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Paths to the fitted assets plus the decision threshold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub model_path: PathBuf,
    pub vectorizer_path: PathBuf,
    #[serde(default)]
    pub threshold: Threshold,
}

impl Settings {
    /// Build settings from raw values, validating the threshold.
    pub fn new(
        model_path: impl Into<PathBuf>,
        vectorizer_path: impl Into<PathBuf>,
        threshold: f64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            model_path: model_path.into(),
            vectorizer_path: vectorizer_path.into(),
            threshold: Threshold::new(threshold)?,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            vectorizer_path: PathBuf::from(DEFAULT_VECTORIZER_PATH),
            threshold: Threshold::default(),
        }
    }
}
