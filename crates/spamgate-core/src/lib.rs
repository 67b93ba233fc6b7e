pub mod config;
pub mod decision;
mod error;

pub use config::{DEFAULT_THRESHOLD, Settings, Threshold};
pub use decision::{DecisionModel, Label, Outcome, Pipeline, Vectorizer, Verdict, classify, sigmoid};
pub use error::{ClassifyError, ConfigError, ModelError};
