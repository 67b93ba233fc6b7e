//! TF-IDF vectorizer matching scikit-learn's `TfidfVectorizer.transform`.
//!
//! The fitted state (vocabulary, idf weights, analyzer options) is read from a
//! JSON export of the Python object. Only inference is supported: lowercase,
//! tokenize with the token pattern, drop stop words, build word n-grams, count,
//! weight by idf, normalize.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use spamgate_core::{ModelError, Vectorizer};

use crate::features::SparseVector;

/// scikit-learn's default `token_pattern`: runs of two or more word characters.
const SKLEARN_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// What the default pattern matches under Python's `re`, where `\w` is letters,
/// numbers and `_` but not combining marks. Rust's `\w` also takes marks.
const WORD_RUN_PATTERN: &str = r"[\p{L}\p{N}_]{2,}";

/// Row normalization applied after idf weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// A fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TfidfAsset")]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    stop_words: HashSet<String>,
    binary: bool,
    token_pattern: Regex,
}

/// On-disk shape of the vectorizer, before validation.
#[derive(Deserialize)]
struct TfidfAsset {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default)]
    stop_words: Option<Vec<String>>,
    #[serde(default)]
    binary: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

fn default_token_pattern() -> String {
    SKLEARN_TOKEN_PATTERN.to_string()
}

impl TryFrom<TfidfAsset> for TfidfVectorizer {
    type Error = String;

    fn try_from(asset: TfidfAsset) -> Result<Self, Self::Error> {
        let dim = asset.idf.len();
        if asset.vocabulary.is_empty() {
            return Err("vocabulary is empty".into());
        }
        if asset.vocabulary.len() != dim {
            return Err(format!(
                "vocabulary has {} terms but idf has {dim} weights",
                asset.vocabulary.len()
            ));
        }
        if let Some((term, col)) = asset.vocabulary.iter().find(|(_, c)| **c >= dim) {
            return Err(format!("term {term:?} maps to column {col}, dimension is {dim}"));
        }
        let distinct: HashSet<usize> = asset.vocabulary.values().copied().collect();
        if distinct.len() != dim {
            return Err("vocabulary maps several terms to the same column".into());
        }
        if asset.idf.iter().any(|w| !w.is_finite()) {
            return Err("idf contains non-finite weights".into());
        }

        let (min_n, max_n) = asset.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }

        let pattern = match asset.token_pattern.as_str() {
            SKLEARN_TOKEN_PATTERN => WORD_RUN_PATTERN,
            custom => custom,
        };
        let token_pattern = Regex::new(pattern)
            .map_err(|e| format!("invalid token_pattern: {e}"))?;

        Ok(Self {
            vocabulary: asset.vocabulary,
            idf: asset.idf,
            lowercase: asset.lowercase,
            ngram_range: asset.ngram_range,
            sublinear_tf: asset.sublinear_tf,
            norm: asset.norm,
            stop_words: asset.stop_words.unwrap_or_default().into_iter().collect(),
            binary: asset.binary,
            token_pattern,
        })
    }
}

impl TfidfVectorizer {
    /// Feature dimension (number of vocabulary columns).
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    pub fn norm(&self) -> Option<Norm> {
        self.norm
    }

    /// Split text into the terms looked up in the vocabulary.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text: Cow<'_, str> = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

impl Vectorizer for TfidfVectorizer {
    type Features = SparseVector;

    fn transform(&self, text: &str) -> Result<SparseVector, ModelError> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(col, count)| {
                let tf = if self.binary {
                    1.0
                } else if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                (col, tf * self.idf[col])
            })
            .collect();

        let mut features = SparseVector::from_entries(self.dim(), entries)?;

        if let Some(norm) = self.norm {
            let length = match norm {
                Norm::L1 => features.entries().iter().map(|(_, v)| v.abs()).sum::<f64>(),
                Norm::L2 => features
                    .entries()
                    .iter()
                    .map(|(_, v)| v * v)
                    .sum::<f64>()
                    .sqrt(),
            };
            if length > 0.0 {
                features.scale(1.0 / length);
            }
        }

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn vocab() -> Value {
        json!({"free": 0, "prize": 1, "win": 2, "meeting": 3, "free prize": 4})
    }

    fn build(extra: Value) -> TfidfVectorizer {
        let mut asset = json!({
            "vocabulary": vocab(),
            "idf": [1.0, 2.0, 1.5, 1.0, 3.0],
        });
        if let (Value::Object(base), Value::Object(more)) = (&mut asset, extra) {
            base.extend(more);
        }
        serde_json::from_value(asset).unwrap()
    }

    fn value_at(v: &SparseVector, col: usize) -> f64 {
        v.entries()
            .iter()
            .find(|(i, _)| *i == col)
            .map(|(_, x)| *x)
            .unwrap_or(0.0)
    }

    #[test]
    fn defaults_follow_sklearn() {
        let tfidf = build(json!({}));
        assert_eq!(tfidf.dim(), 5);
        assert_eq!(tfidf.ngram_range(), (1, 1));
        assert_eq!(tfidf.norm(), Some(Norm::L2));
    }

    #[test]
    fn analyze_lowercases_and_drops_short_tokens() {
        let tfidf = build(json!({}));
        assert_eq!(tfidf.analyze("WIN a FREE prize!"), vec!["win", "free", "prize"]);
    }

    #[test]
    fn default_pattern_keeps_digits_and_underscores() {
        let tfidf = build(json!({}));
        assert_eq!(tfidf.analyze("call_me 0800 now x"), vec!["call_me", "0800", "now"]);
    }

    #[test]
    fn default_pattern_splits_on_combining_marks() {
        // Python's \w excludes marks, so the virama and vowel sign end tokens.
        let tfidf = build(json!({}));
        assert_eq!(tfidf.analyze("नमस्ते"), vec!["नमस"]);
        assert_eq!(tfidf.analyze("cafe\u{301} prize"), vec!["cafe", "prize"]);
    }

    #[test]
    fn explicit_sklearn_pattern_is_the_default() {
        let tfidf = build(json!({"token_pattern": "(?u)\\b\\w\\w+\\b"}));
        assert_eq!(tfidf.analyze("नमस्ते free"), vec!["नमस", "free"]);
    }

    #[test]
    fn custom_pattern_used_verbatim() {
        let tfidf = build(json!({"token_pattern": r"\S+"}));
        assert_eq!(tfidf.analyze("a free!"), vec!["a", "free!"]);
    }

    #[test]
    fn analyze_builds_bigrams_after_stop_words() {
        let tfidf = build(json!({"ngram_range": [1, 2], "stop_words": ["the"]}));
        assert_eq!(
            tfidf.analyze("the free prize"),
            vec!["free", "prize", "free prize"]
        );
    }

    #[test]
    fn transform_counts_times_idf_without_norm() {
        let tfidf = build(json!({"norm": null}));
        let v = tfidf.transform("prize prize win").unwrap();
        assert_eq!(v.dim(), 5);
        assert!((value_at(&v, 1) - 4.0).abs() < 1e-12);
        assert!((value_at(&v, 2) - 1.5).abs() < 1e-12);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn transform_l2_normalizes() {
        let tfidf = build(json!({}));
        let v = tfidf.transform("free prize win meeting").unwrap();
        let norm: f64 = v.entries().iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transform_l1_normalizes() {
        let tfidf = build(json!({"norm": "l1"}));
        let v = tfidf.transform("free prize").unwrap();
        let total: f64 = v.entries().iter().map(|(_, x)| x.abs()).sum();
        assert!((total - 1.0).abs() < 1e-12);
        // idf 1.0 vs 2.0 → one third / two thirds.
        assert!((value_at(&v, 0) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn transform_bigram_column() {
        let tfidf = build(json!({"ngram_range": [1, 2], "norm": null}));
        let v = tfidf.transform("Free Prize").unwrap();
        assert!((value_at(&v, 4) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn stop_words_never_reach_vocabulary() {
        let tfidf = build(json!({"stop_words": ["free"], "ngram_range": [1, 2], "norm": null}));
        let v = tfidf.transform("free prize").unwrap();
        assert_eq!(value_at(&v, 0), 0.0);
        assert_eq!(value_at(&v, 4), 0.0);
        assert!((value_at(&v, 1) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sublinear_tf() {
        let tfidf = build(json!({"sublinear_tf": true, "norm": null}));
        let v = tfidf.transform("free free free").unwrap();
        assert!((value_at(&v, 0) - (1.0 + 3.0f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn binary_counts() {
        let tfidf = build(json!({"binary": true, "norm": null}));
        let v = tfidf.transform("prize prize prize").unwrap();
        assert!((value_at(&v, 1) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn case_sensitive_when_lowercase_disabled() {
        let tfidf = build(json!({"lowercase": false}));
        assert!(tfidf.transform("FREE PRIZE").unwrap().is_zero());
        assert!(!tfidf.transform("free").unwrap().is_zero());
    }

    #[test]
    fn unknown_terms_give_zero_vector() {
        let tfidf = build(json!({}));
        let v = tfidf.transform("quarterly budget review").unwrap();
        assert!(v.is_zero());
        assert_eq!(v.dim(), 5);
    }

    #[test]
    fn rejects_idf_length_mismatch() {
        let result: Result<TfidfVectorizer, _> =
            serde_json::from_value(json!({"vocabulary": vocab(), "idf": [1.0, 2.0]}));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("idf has 2 weights"), "{err}");
    }

    #[test]
    fn rejects_column_out_of_range() {
        let result: Result<TfidfVectorizer, _> =
            serde_json::from_value(json!({"vocabulary": {"a": 0, "b": 5}, "idf": [1.0, 1.0]}));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_ngram_range() {
        let result: Result<TfidfVectorizer, _> = serde_json::from_value(json!({
            "vocabulary": vocab(),
            "idf": [1.0, 2.0, 1.5, 1.0, 3.0],
            "ngram_range": [2, 1],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_token_pattern() {
        let result: Result<TfidfVectorizer, _> = serde_json::from_value(json!({
            "vocabulary": vocab(),
            "idf": [1.0, 2.0, 1.5, 1.0, 3.0],
            "token_pattern": "(unclosed",
        }));
        assert!(result.is_err());
    }
}
