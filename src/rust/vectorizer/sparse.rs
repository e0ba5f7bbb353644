/// Sparse feature vector with strictly increasing indices and no stored zeros.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Builds a vector from `(index, value)` pairs. Pairs are sorted by index and zero
    /// values are dropped; indices must be unique.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.retain(|&(_, v)| v != 0.0);
        pairs.sort_by_key(|&(i, _)| i);
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn get(&self, index: usize) -> f64 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|&x| x * x).sum::<f64>().sqrt()
    }

    /// Scales the vector to unit Euclidean length. An empty vector is left unchanged.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Dot product with a dense row.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| dense[i] * v).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_drops_zeros() {
        let v = SparseVector::from_pairs(vec![(4, 2.0), (1, 0.0), (0, 1.0)]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, 1.0), (4, 2.0)]);
        assert_eq!(v.get(4), 2.0);
        assert_eq!(v.get(1), 0.0);
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = SparseVector::from_pairs(vec![(0, 3.0), (2, 4.0)]);
        v.l2_normalize();
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!((v.get(0) - 0.6).abs() < 1e-12);

        let mut empty = SparseVector::default();
        empty.l2_normalize();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_dot() {
        let v = SparseVector::from_pairs(vec![(0, 1.0), (2, 2.0)]);
        assert_eq!(v.dot(&[1.0, 5.0, 3.0]), 7.0);
    }
}
