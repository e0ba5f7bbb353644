use std::cmp::Ordering;

use ndarray::{Array1, Array2};

use super::error::{CategorizerError, Result};
use super::utils::{argmax, softmax};
use crate::vectorizer::SparseVector;

/// Fitted multinomial logistic regression parameters.
///
/// Row `k` of `weights` and entry `k` of `bias` belong to `categories[k]`; columns follow
/// the vocabulary order of the vectorizer the model was trained with.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    categories: Vec<String>,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticRegression {
    /// Assembles a model from raw parameters.
    ///
    /// # Errors
    /// - `InvalidArtifact` if shapes disagree or fewer than two categories are given
    pub fn from_parts(
        categories: Vec<String>,
        weights: Array2<f64>,
        bias: Array1<f64>,
    ) -> Result<Self> {
        if categories.len() < 2 {
            return Err(CategorizerError::InvalidArtifact(format!(
                "A multiclass model needs at least 2 categories, got {}",
                categories.len()
            )));
        }
        if weights.nrows() != categories.len() || bias.len() != categories.len() {
            return Err(CategorizerError::InvalidArtifact(format!(
                "Parameter shape mismatch: {} categories, {} weight rows, {} biases",
                categories.len(),
                weights.nrows(),
                bias.len()
            )));
        }
        Ok(Self {
            categories,
            weights,
            bias,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    pub fn num_features(&self) -> usize {
        self.weights.ncols()
    }

    /// Linear scores `w_k . x + b_k` for every category.
    pub fn decision_function(&self, x: &SparseVector) -> Array1<f64> {
        let mut scores = self.bias.clone();
        for (k, score) in scores.iter_mut().enumerate() {
            *score += x
                .iter()
                .filter(|&(j, _)| j < self.weights.ncols())
                .map(|(j, v)| self.weights[[k, j]] * v)
                .sum::<f64>();
        }
        scores
    }

    pub fn predict_proba(&self, x: &SparseVector) -> Array1<f64> {
        softmax(&self.decision_function(x))
    }

    /// Index into [`categories`](Self::categories) of the most probable category.
    pub fn predict_index(&self, x: &SparseVector) -> usize {
        argmax(&self.decision_function(x)).unwrap_or(0)
    }

    pub fn predict(&self, x: &SparseVector) -> &str {
        &self.categories[self.predict_index(x)]
    }

    /// Share of `features` whose prediction matches `labels`.
    pub fn score<S: AsRef<str>>(&self, features: &[SparseVector], labels: &[S]) -> f64 {
        if features.is_empty() {
            return 0.0;
        }
        let correct = features
            .iter()
            .zip(labels)
            .filter(|(x, y)| self.predict(x) == y.as_ref())
            .count();
        correct as f64 / features.len() as f64
    }

    /// The `n` largest raw weights per category, paired with their feature names.
    pub fn top_features(&self, vocabulary: &[String], n: usize) -> Vec<(String, Vec<(String, f64)>)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(k, category)| {
                let row = self.weights.row(k);
                let mut ranked: Vec<usize> = (0..row.len()).collect();
                ranked.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(Ordering::Equal));
                let top = ranked
                    .into_iter()
                    .take(n)
                    .filter_map(|j| vocabulary.get(j).map(|f| (f.clone(), row[j])))
                    .collect();
                (category.clone(), top)
            })
            .collect()
    }
}
