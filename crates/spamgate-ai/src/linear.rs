//! Linear margin model (e.g. a fitted `LinearSVC`).
//!
//! Accepts the shapes scikit-learn exports directly: `coef_` as a flat list or
//! a single-row matrix, `intercept_` as a scalar or a one-element list.

use serde::Deserialize;
use spamgate_core::{DecisionModel, ModelError};

use crate::features::SparseVector;

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "LinearAsset")]
pub struct LinearModel {
    coef: Vec<f64>,
    intercept: f64,
    classes: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coefficients {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Intercept {
    Scalar(f64),
    Vector(Vec<f64>),
}

#[derive(Deserialize)]
struct LinearAsset {
    coef: Coefficients,
    #[serde(default)]
    intercept: Option<Intercept>,
    #[serde(default)]
    classes: Option<Vec<String>>,
}

impl TryFrom<LinearAsset> for LinearModel {
    type Error = String;

    fn try_from(asset: LinearAsset) -> Result<Self, Self::Error> {
        let coef = match asset.coef {
            Coefficients::Flat(c) => c,
            Coefficients::Rows(mut rows) => {
                if rows.len() != 1 {
                    return Err(format!(
                        "expected a single row of coefficients for a binary model, got {}",
                        rows.len()
                    ));
                }
                rows.remove(0)
            }
        };
        let intercept = match asset.intercept {
            None => 0.0,
            Some(Intercept::Scalar(b)) => b,
            Some(Intercept::Vector(v)) if v.len() == 1 => v[0],
            Some(Intercept::Vector(v)) => {
                return Err(format!("expected one intercept, got {}", v.len()));
            }
        };

        if let Some(classes) = &asset.classes
            && classes.len() != 2
        {
            return Err(format!("expected two classes, got {}", classes.len()));
        }

        Self::new(coef, intercept).map(|m| Self {
            classes: asset.classes,
            ..m
        })
    }
}

impl LinearModel {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self, String> {
        if coef.is_empty() {
            return Err("model has no coefficients".into());
        }
        if !intercept.is_finite() || coef.iter().any(|w| !w.is_finite()) {
            return Err("model contains non-finite weights".into());
        }
        Ok(Self {
            coef,
            intercept,
            classes: None,
        })
    }

    /// Number of input features the model expects.
    pub fn dim(&self) -> usize {
        self.coef.len()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Class names as recorded at fit time, negative class first.
    pub fn classes(&self) -> Option<&[String]> {
        self.classes.as_deref()
    }
}

impl DecisionModel<SparseVector> for LinearModel {
    fn decision_function(&self, features: &SparseVector) -> Result<f64, ModelError> {
        Ok(self.intercept + features.dot(&self.coef)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn margin_is_intercept_plus_dot() {
        let model = LinearModel::new(vec![2.0, -1.0, 0.5], -0.25).unwrap();
        let x = SparseVector::from_entries(3, vec![(0, 1.0), (2, 2.0)]).unwrap();
        let score = model.decision_function(&x).unwrap();
        assert!((score - 2.75).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_scores_intercept() {
        let model = LinearModel::new(vec![1.0, 1.0], -0.8).unwrap();
        let score = model.decision_function(&SparseVector::zeros(2)).unwrap();
        assert_eq!(score, -0.8);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let model = LinearModel::new(vec![1.0, 1.0], 0.0).unwrap();
        let err = model.decision_function(&SparseVector::zeros(3)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn deserializes_sklearn_shapes() {
        let model: LinearModel = serde_json::from_value(json!({
            "coef": [[0.1, 0.2, 0.3]],
            "intercept": [-1.5],
            "classes": ["ham", "spam"],
        }))
        .unwrap();
        assert_eq!(model.dim(), 3);
        assert_eq!(model.intercept(), -1.5);
        assert_eq!(model.classes().unwrap()[1], "spam");
    }

    #[test]
    fn deserializes_flat_shapes() {
        let model: LinearModel =
            serde_json::from_value(json!({"coef": [1.0, 2.0], "intercept": 0.5})).unwrap();
        assert_eq!(model.dim(), 2);
        assert_eq!(model.intercept(), 0.5);
        assert!(model.classes().is_none());
    }

    #[test]
    fn rejects_multiclass_coefficients() {
        let result: Result<LinearModel, _> =
            serde_json::from_value(json!({"coef": [[1.0], [2.0]], "intercept": [0.0, 0.0]}));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_coefficients() {
        assert!(LinearModel::new(vec![], 0.0).is_err());
        let result: Result<LinearModel, _> = serde_json::from_value(json!({"coef": []}));
        assert!(result.is_err());
    }
}
