use std::collections::HashMap;
use std::path::Path;

use super::error::Result;
use super::model::LogisticRegression;
use super::trainer::FitReport;
use crate::artifact::ModelArtifact;
use crate::categories::CategoryRegistry;
use crate::config::TrainingConfig;
use crate::evaluation::{ClassificationReport, CrossValidation};
use crate::record::TransactionRecord;
use crate::vectorizer::{SparseVector, TfidfVectorizer};

/// Evaluation figures gathered while training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingMetrics {
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub cross_validation: CrossValidation,
    /// Held-out split report
    pub report: ClassificationReport,
    /// Labeled records left after category filtering
    pub training_samples: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub fit: FitReport,
}

/// A trained transaction categorizer: a frozen TF-IDF vectorizer plus a multinomial
/// logistic regression over its features.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use spend_classifier::{dataset, Categorizer, TransactionRecord};
///
/// let categorizer = Categorizer::builder()
///     .add_records(dataset::synthetic_records())?
///     .build()?;
///
/// let record = TransactionRecord::new("Uber ride to airport").with_amount(540.0);
/// let (category, scores) = categorizer.predict(&record)?;
/// println!("{} ({:.1}%)", category, scores[&category] * 100.0);
///
/// categorizer.export("model.json")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Categorizer {
    registry: CategoryRegistry,
    config: TrainingConfig,
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
    metrics: TrainingMetrics,
}

impl Categorizer {
    pub(crate) fn new(
        registry: CategoryRegistry,
        config: TrainingConfig,
        vectorizer: TfidfVectorizer,
        model: LogisticRegression,
        metrics: TrainingMetrics,
    ) -> Self {
        Self {
            registry,
            config,
            vectorizer,
            model,
            metrics,
        }
    }

    /// Creates a new CategorizerBuilder for fluent construction
    pub fn builder() -> super::builder::CategorizerBuilder {
        super::builder::CategorizerBuilder::new()
    }

    /// Returns information about the trained model
    pub fn info(&self) -> super::CategorizerInfo {
        super::CategorizerInfo {
            num_categories: self.model.categories().len(),
            categories: self.model.categories().to_vec(),
            num_features: self.vectorizer.len(),
            training_samples: self.metrics.training_samples,
            test_accuracy: self.metrics.test_accuracy,
            cv_accuracy: self.metrics.cross_validation.mean,
        }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Builds the document for `record` and vectorizes it.
    pub fn features(&self, record: &TransactionRecord) -> Result<SparseVector> {
        self.vectorizer.transform(&record.document())
    }

    /// Predicts the category of a transaction.
    ///
    /// # Returns
    /// A tuple containing:
    /// * The most probable category
    /// * A HashMap of every trained category to its probability
    pub fn predict(&self, record: &TransactionRecord) -> Result<(String, HashMap<String, f64>)> {
        let x = self.features(record)?;
        let probabilities = self.model.predict_proba(&x);
        let best = self.model.predict(&x).to_string();
        let scores = self
            .model
            .categories()
            .iter()
            .cloned()
            .zip(probabilities.iter().copied())
            .collect();
        Ok((best, scores))
    }

    /// Categories sorted by descending probability.
    pub fn predict_ranked(&self, record: &TransactionRecord) -> Result<Vec<(String, f64)>> {
        let (_, scores) = self.predict(record)?;
        let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| self.registry.position(&a.0).cmp(&self.registry.position(&b.0)))
        });
        Ok(ranked)
    }

    /// Highest-weighted features per category, for inspection only.
    pub fn top_features(&self, n: usize) -> Vec<(String, Vec<(String, f64)>)> {
        self.model.top_features(self.vectorizer.vocabulary(), n)
    }

    /// Builds the interchange artifact for this model.
    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact::from_categorizer(self)
    }

    /// Writes the interchange artifact to `path` atomically.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<ModelArtifact> {
        let artifact = self.to_artifact();
        artifact.write(path)?;
        Ok(artifact)
    }
}
