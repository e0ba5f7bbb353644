//! Data splitting and accuracy metrics.

use std::collections::HashMap;

use log::{debug, info};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::categories::CategoryRegistry;
use crate::classifier::{trainer, CategorizerError, Result};
use crate::config::TrainingConfig;
use crate::vectorizer::SparseVector;

/// Row indices of a train/test partition, each in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Groups sample indices by label, in registry order, keeping input order within a group.
fn indices_by_category<S: AsRef<str>>(labels: &[S], registry: &CategoryRegistry) -> Vec<(String, Vec<usize>)> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, label) in labels.iter().enumerate() {
        groups.entry(label.as_ref()).or_default().push(i);
    }
    registry
        .labels()
        .iter()
        .filter_map(|c| groups.remove(c.as_str()).map(|idx| (c.clone(), idx)))
        .collect()
}

/// Checks that every category can be stratified: each has at least two examples and there
/// are at least two categories.
pub fn check_stratifiable<S: AsRef<str>>(labels: &[S], registry: &CategoryRegistry) -> Result<()> {
    if labels.is_empty() {
        return Err(CategorizerError::TrainingData("No labeled records to train on".into()));
    }
    let groups = indices_by_category(labels, registry);
    if let Some((category, idx)) = groups.iter().find(|(_, idx)| idx.len() < 2) {
        return Err(CategorizerError::InsufficientData {
            category: category.clone(),
            count: idx.len(),
        });
    }
    if groups.len() < 2 {
        return Err(CategorizerError::TrainingData(format!(
            "At least 2 distinct categories are required, found {}",
            groups.len()
        )));
    }
    Ok(())
}

/// Seeded stratified train/test split.
///
/// Each category sends `round(count * test_ratio)` of its samples to the test side, clamped
/// so both sides get at least one. Categories are shuffled in registry order from a single
/// seeded generator, so identical input yields identical splits.
pub fn stratified_split<S: AsRef<str>>(
    labels: &[S],
    registry: &CategoryRegistry,
    test_ratio: f64,
    seed: u64,
) -> Result<Split> {
    check_stratifiable(labels, registry)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (category, mut idx) in indices_by_category(labels, registry) {
        idx.shuffle(&mut rng);
        let n_test = ((idx.len() as f64 * test_ratio).round() as usize).clamp(1, idx.len() - 1);
        debug!("{}: {} train / {} test", category, idx.len() - n_test, n_test);
        test.extend_from_slice(&idx[..n_test]);
        train.extend_from_slice(&idx[n_test..]);
    }
    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}

/// Stratified k-fold assignment without shuffling.
///
/// Samples of each category are dealt round-robin across folds, continuing from where the
/// previous category stopped. Folds with no samples are omitted.
pub fn stratified_kfold<S: AsRef<str>>(
    labels: &[S],
    registry: &CategoryRegistry,
    folds: usize,
) -> Vec<Split> {
    let mut assignment = vec![0usize; labels.len()];
    let mut offset = 0;
    for (_, idx) in indices_by_category(labels, registry) {
        for (j, &i) in idx.iter().enumerate() {
            assignment[i] = (offset + j) % folds;
        }
        offset += idx.len();
    }
    (0..folds)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| assignment[i] == fold);
            Split { train, test }
        })
        .filter(|split| !split.test.is_empty())
        .collect()
}

pub fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

/// Cross-validation accuracy figures.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub scores: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation of `scores`
    pub std: f64,
}

impl CrossValidation {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        if scores.is_empty() {
            return Self { scores, mean: 0.0, std: 0.0 };
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let std = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
        Self { scores, mean, std }
    }
}

/// Refits a fresh model on each fold and scores it on the held-out part.
///
/// The supplied feature vectors are used as-is; only the classifier is refit.
pub fn cross_validate<S: AsRef<str>>(
    features: &[SparseVector],
    labels: &[S],
    num_features: usize,
    registry: &CategoryRegistry,
    config: &TrainingConfig,
) -> Result<CrossValidation> {
    let labels: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
    let mut scores = Vec::new();
    for (fold, split) in stratified_kfold(&labels, registry, config.cv_folds()).iter().enumerate() {
        let (model, _) = trainer::fit(
            &select(features, &split.train),
            &select(&labels, &split.train),
            num_features,
            registry,
            config,
        )?;
        let score = model.score(&select(features, &split.test), &select(&labels, &split.test));
        debug!("Fold {}: accuracy {:.4}", fold + 1, score);
        scores.push(score);
    }
    let cv = CrossValidation::from_scores(scores);
    info!("CV accuracy: {:.4} (+/- {:.4})", cv.mean, cv.std * 2.0);
    Ok(cv)
}

pub fn accuracy<A: AsRef<str>, B: AsRef<str>>(predicted: &[A], actual: &[B]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p.as_ref() == a.as_ref())
        .count();
    correct as f64 / actual.len() as f64
}

/// Precision, recall and F1 for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMetrics {
    pub category: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-category metrics plus averages and the confusion matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub categories: Vec<CategoryMetrics>,
    pub accuracy: f64,
    pub macro_f1: f64,
    pub weighted_f1: f64,
    /// `confusion[[actual, predicted]]`, indexed like `categories`
    pub confusion: Array2<usize>,
}

impl ClassificationReport {
    /// Builds a report over the registry categories that occur in either list.
    pub fn new<A: AsRef<str>, B: AsRef<str>>(
        predicted: &[A],
        actual: &[B],
        registry: &CategoryRegistry,
    ) -> Self {
        let labels = registry.ordered_subset(
            predicted
                .iter()
                .map(|p| p.as_ref())
                .chain(actual.iter().map(|a| a.as_ref())),
        );
        let position: HashMap<&str, usize> =
            labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();

        let mut confusion = Array2::<usize>::zeros((labels.len(), labels.len()));
        for (p, a) in predicted.iter().zip(actual) {
            if let (Some(&pi), Some(&ai)) = (position.get(p.as_ref()), position.get(a.as_ref())) {
                confusion[[ai, pi]] += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let categories: Vec<CategoryMetrics> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = confusion[[i, i]];
                let predicted_total = confusion.column(i).sum();
                let support = confusion.row(i).sum();
                let precision = ratio(tp, predicted_total);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                CategoryMetrics {
                    category: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total_support: usize = categories.iter().map(|c| c.support).sum();
        let macro_f1 = if categories.is_empty() {
            0.0
        } else {
            categories.iter().map(|c| c.f1).sum::<f64>() / categories.len() as f64
        };
        let weighted_f1 = if total_support == 0 {
            0.0
        } else {
            categories.iter().map(|c| c.f1 * c.support as f64).sum::<f64>() / total_support as f64
        };

        Self {
            categories,
            accuracy: accuracy(predicted, actual),
            macro_f1,
            weighted_f1,
            confusion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_labels() -> Vec<&'static str> {
        let mut labels = Vec::new();
        for _ in 0..30 {
            labels.push("Groceries");
            labels.push("Shopping");
            labels.push("Travel");
        }
        labels
    }

    #[test]
    fn test_stratified_split_proportions() -> Result<()> {
        let labels = balanced_labels();
        let registry = CategoryRegistry::default();
        let split = stratified_split(&labels, &registry, 0.2, 42)?;
        assert_eq!(split.train.len() + split.test.len(), 90);
        for category in ["Groceries", "Shopping", "Travel"] {
            let n = split.test.iter().filter(|&&i| labels[i] == category).count();
            assert!((5..=7).contains(&n), "{} has {} test samples", category, n);
        }
        Ok(())
    }

    #[test]
    fn test_split_is_reproducible() -> Result<()> {
        let labels = balanced_labels();
        let registry = CategoryRegistry::default();
        let a = stratified_split(&labels, &registry, 0.2, 42)?;
        let b = stratified_split(&labels, &registry, 0.2, 42)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_small_category_rejected() {
        let labels = vec!["Groceries", "Groceries", "Travel"];
        let err = stratified_split(&labels, &CategoryRegistry::default(), 0.2, 42).unwrap_err();
        match err {
            CategorizerError::InsufficientData { category, count } => {
                assert_eq!(category, "Travel");
                assert_eq!(count, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_two_example_category_splits_one_each() -> Result<()> {
        let labels = vec!["Groceries", "Groceries", "Travel", "Travel"];
        let split = stratified_split(&labels, &CategoryRegistry::default(), 0.2, 1)?;
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 2);
        Ok(())
    }

    #[test]
    fn test_kfold_covers_every_sample_once() {
        let labels = balanced_labels();
        let folds = stratified_kfold(&labels, &CategoryRegistry::default(), 5);
        assert_eq!(folds.len(), 5);
        let mut seen = vec![0; labels.len()];
        for fold in &folds {
            assert_eq!(fold.test.len(), 18);
            for &i in &fold.test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_cv_statistics() {
        let cv = CrossValidation::from_scores(vec![0.5, 1.0]);
        assert_eq!(cv.mean, 0.75);
        assert_eq!(cv.std, 0.25);
    }

    #[test]
    fn test_classification_report() {
        let actual = ["Groceries", "Groceries", "Travel", "Travel"];
        let predicted = ["Groceries", "Travel", "Travel", "Travel"];
        let report = ClassificationReport::new(&predicted, &actual, &CategoryRegistry::default());
        assert_eq!(report.accuracy, 0.75);
        let groceries = &report.categories[0];
        assert_eq!(groceries.category, "Groceries");
        assert_eq!(groceries.precision, 1.0);
        assert_eq!(groceries.recall, 0.5);
        let travel = &report.categories[1];
        assert!((travel.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(travel.recall, 1.0);
        assert_eq!(report.confusion[[0, 1]], 1);
    }
}
