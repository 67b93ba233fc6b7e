//! Spam/ham decision procedure.
//!
//! Text goes through a fitted [`Vectorizer`], the resulting features through a
//! margin-based [`DecisionModel`], and the raw margin is squashed with a
//! logistic sigmoid. The label comes from comparing that confidence against a
//! fixed [`Threshold`], not from the model's own predicted class.

use serde::Serialize;
use tracing::debug;

use crate::config::Threshold;
use crate::error::{ClassifyError, ModelError};

/// A fitted text-to-features transform.
pub trait Vectorizer {
    type Features;

    fn transform(&self, text: &str) -> Result<Self::Features, ModelError>;
}

/// A fitted model exposing a signed margin score for one feature vector.
pub trait DecisionModel<F> {
    fn decision_function(&self, features: &F) -> Result<f64, ModelError>;
}

impl<F, M: DecisionModel<F> + ?Sized> DecisionModel<F> for Box<M> {
    fn decision_function(&self, features: &F) -> Result<f64, ModelError> {
        (**self).decision_function(features)
    }
}

impl<F, M: DecisionModel<F> + ?Sized> DecisionModel<F> for &M {
    fn decision_function(&self, features: &F) -> Result<f64, ModelError> {
        (**self).decision_function(features)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
}

impl Label {
    /// `Spam` iff `confidence >= threshold`.
    pub fn from_confidence(confidence: f64, threshold: Threshold) -> Self {
        if confidence >= threshold.value() {
            Self::Spam
        } else {
            Self::Ham
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "SPAM",
            Self::Ham => "HAM",
        }
    }

    /// Human-facing label shown next to a verdict.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spam => "SPAM",
            Self::Ham => "HAM (Not Spam)",
        }
    }
}

/// Result of classifying one non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Label,
    /// sigmoid(score), in (0, 1).
    pub confidence: f64,
    /// Raw margin from the decision model.
    pub score: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Input was empty or whitespace only; the model was not consulted.
    Empty,
    Classified(Verdict),
}

impl Outcome {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Empty => None,
            Self::Classified(v) => Some(v),
        }
    }
}

/// Logistic sigmoid, branching on sign so `exp` never overflows.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Classify `text` with the given collaborators and threshold.
///
/// Blank input short-circuits to [`Outcome::Empty`] without touching either
/// collaborator. Collaborator failures and non-finite scores are returned as
/// [`ClassifyError`] rather than mapped to a label.
pub fn classify<V, M>(
    text: &str,
    model: &M,
    vectorizer: &V,
    threshold: Threshold,
) -> Result<Outcome, ClassifyError>
where
    V: Vectorizer + ?Sized,
    M: DecisionModel<V::Features> + ?Sized,
{
    if text.trim().is_empty() {
        return Ok(Outcome::Empty);
    }

    let features = vectorizer
        .transform(text)
        .map_err(ClassifyError::Vectorize)?;
    let score = model
        .decision_function(&features)
        .map_err(ClassifyError::Model)?;
    if !score.is_finite() {
        return Err(ClassifyError::NonFiniteScore(score));
    }

    let confidence = sigmoid(score);
    let label = Label::from_confidence(confidence, threshold);
    debug!(score, confidence, label = label.as_str(), "classified text");

    Ok(Outcome::Classified(Verdict {
        label,
        confidence,
        score,
        threshold: threshold.value(),
    }))
}

/// A loaded vectorizer/model pair plus the threshold they are judged against.
///
/// Built once at startup and passed by reference to whatever needs to
/// classify. Nothing in it changes after construction.
pub struct Pipeline<V, M> {
    vectorizer: V,
    model: M,
    threshold: Threshold,
}

impl<V, M> Pipeline<V, M>
where
    V: Vectorizer,
    M: DecisionModel<V::Features>,
{
    pub fn new(vectorizer: V, model: M, threshold: Threshold) -> Self {
        Self {
            vectorizer,
            model,
            threshold,
        }
    }

    pub fn classify(&self, text: &str) -> Result<Outcome, ClassifyError> {
        classify(text, &self.model, &self.vectorizer, self.threshold)
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }
}
