//! Fitted inference assets: TF-IDF features, a linear margin model, and their loader.

mod assets;
mod features;
mod linear;
mod tfidf;

pub use assets::{AssetError, AssetSummary, Assets};
pub use features::SparseVector;
pub use linear::LinearModel;
pub use tfidf::{Norm, TfidfVectorizer};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
