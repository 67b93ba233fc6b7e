//! Sparse feature vectors produced by the vectorizer.

use spamgate_core::ModelError;

/// A fixed-dimension vector storing only its non-zero entries.
///
/// Entries are sorted by column index, unique, and every index is `< dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// All-zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs in any order.
    ///
    /// Duplicate indices are summed and explicit zeros are dropped.
    pub fn from_entries(
        dim: usize,
        mut entries: Vec<(usize, f64)>,
    ) -> Result<Self, ModelError> {
        if let Some(&(index, _)) = entries.iter().find(|(i, _)| *i >= dim) {
            return Err(ModelError::IndexOutOfRange { index, dim });
        }

        entries.sort_by_key(|&(i, _)| i);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (i, v) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == i => last.1 += v,
                _ => merged.push((i, v)),
            }
        }
        merged.retain(|&(_, v)| v != 0.0);

        Ok(Self {
            dim,
            entries: merged,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense weight vector of the same dimension.
    pub fn dot(&self, weights: &[f64]) -> Result<f64, ModelError> {
        if weights.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: weights.len(),
                actual: self.dim,
            });
        }
        Ok(self.entries.iter().map(|&(i, v)| weights[i] * v).sum())
    }

    /// Scale every entry in place.
    pub(crate) fn scale(&mut self, factor: f64) {
        for (_, v) in &mut self.entries {
            *v *= factor;
        }
    }

    /// Dense `f32` copy, for backends that take a full tensor.
    pub fn to_dense_f32(&self) -> Vec<f32> {
        let mut dense = vec![0.0f32; self.dim];
        for &(i, v) in &self.entries {
            dense[i] = v as f32;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_entries_sorts_and_merges() {
        let v = SparseVector::from_entries(5, vec![(3, 1.0), (1, 2.0), (3, 0.5)]).unwrap();
        assert_eq!(v.entries(), &[(1, 2.0), (3, 1.5)]);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn from_entries_drops_zeros() {
        let v =
            SparseVector::from_entries(3, vec![(0, 0.0), (2, 1.0), (1, 1.0), (1, -1.0)]).unwrap();
        assert_eq!(v.entries(), &[(2, 1.0)]);
    }

    #[test]
    fn from_entries_rejects_out_of_range() {
        let err = SparseVector::from_entries(2, vec![(0, 1.0), (2, 1.0)]).unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { index: 2, dim: 2 }));
    }

    #[test]
    fn dot_product() {
        let v = SparseVector::from_entries(4, vec![(0, 1.0), (3, 2.0)]).unwrap();
        let d = v.dot(&[0.5, 9.0, 9.0, -1.0]).unwrap();
        assert!((d - (-1.5)).abs() < 1e-12);
    }

    #[test]
    fn dot_dimension_mismatch() {
        let v = SparseVector::zeros(3);
        assert!(matches!(
            v.dot(&[1.0, 2.0]),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn dense_copy() {
        let v = SparseVector::from_entries(4, vec![(1, 0.25)]).unwrap();
        assert_eq!(v.to_dense_f32(), vec![0.0, 0.25, 0.0, 0.0]);
        assert!(SparseVector::zeros(2).is_zero());
    }
}
