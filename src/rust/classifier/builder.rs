use log::{info, warn};

use super::classifier::{Categorizer, TrainingMetrics};
use super::error::Result;
use super::trainer;
use crate::categories::CategoryRegistry;
use crate::config::TrainingConfig;
use crate::evaluation::{self, ClassificationReport};
use crate::record::{LabeledRecord, TransactionRecord};
use crate::vectorizer::TfidfVectorizer;

/// A builder that collects labeled transactions and trains a [`Categorizer`].
#[derive(Debug, Default)]
pub struct CategorizerBuilder {
    registry: CategoryRegistry,
    config: TrainingConfig,
    records: Vec<LabeledRecord>,
}

impl CategorizerBuilder {
    /// Creates a builder with the default category registry and training configuration
    ///
    /// # Example
    /// ```
    /// use spend_classifier::CategorizerBuilder;
    ///
    /// let builder = CategorizerBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the category registry used to filter training labels
    pub fn with_registry(mut self, registry: CategoryRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the training configuration
    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds one labeled transaction.
    ///
    /// # Returns
    /// * `Result<Self, CategorizerError>` - The builder, or `SchemaValidation` if the amount is
    ///   negative or not finite. Unknown or empty categories are accepted here and filtered
    ///   out by [`build`](Self::build).
    pub fn add_record(mut self, record: LabeledRecord) -> Result<Self> {
        record.record.validate()?;
        self.records.push(record);
        Ok(self)
    }

    /// Adds labeled transactions in order, stopping at the first invalid one
    pub fn add_records<I>(self, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = LabeledRecord>,
    {
        records.into_iter().try_fold(self, |builder, r| builder.add_record(r))
    }

    /// Convenience wrapper around [`add_record`](Self::add_record)
    pub fn add_example(self, record: TransactionRecord, category: impl Into<String>) -> Result<Self> {
        self.add_record(LabeledRecord::new(record, category))
    }

    /// Trains the vectorizer and classifier and evaluates them.
    ///
    /// Records whose category is not in the registry are dropped with a warning. The rest
    /// are split 80/20 (stratified, seeded); the vectorizer and classifier are fit on the
    /// training part. Test accuracy, a classification report and k-fold cross-validation
    /// over the whole filtered corpus are recorded in [`TrainingMetrics`].
    ///
    /// # Errors
    /// - `TrainingData` if nothing is left after filtering, only one category remains, or the
    ///   vocabulary prunes to nothing
    /// - `InsufficientData` if a category has fewer than two records
    pub fn build(self) -> Result<Categorizer> {
        let Self {
            registry,
            config,
            records,
        } = self;

        let total = records.len();
        let records: Vec<LabeledRecord> = records
            .into_iter()
            .filter(|r| registry.contains(&r.category))
            .collect();
        let dropped = total - records.len();
        if dropped > 0 {
            warn!(
                "Dropped {} of {} records with unrecognized categories",
                dropped, total
            );
        }
        info!("Training on {} transactions", records.len());

        let labels: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
        let documents: Vec<String> = records.iter().map(|r| r.record.document()).collect();

        let split = evaluation::stratified_split(&labels, &registry, config.test_ratio(), config.seed())?;
        info!("Training set: {} samples", split.train.len());
        info!("Test set: {} samples", split.test.len());

        let train_docs = evaluation::select(&documents, &split.train);
        let train_labels = evaluation::select(&labels, &split.train);
        let test_labels = evaluation::select(&labels, &split.test);

        let vectorizer = TfidfVectorizer::fit(&train_docs, config.vectorizer())?;
        let all_features = vectorizer.transform_all(&documents)?;
        let train_features = evaluation::select(&all_features, &split.train);
        let test_features = evaluation::select(&all_features, &split.test);

        let (model, fit) = trainer::fit(
            &train_features,
            &train_labels,
            vectorizer.len(),
            &registry,
            &config,
        )?;

        let train_accuracy = model.score(&train_features, &train_labels);
        let test_predictions: Vec<&str> = test_features.iter().map(|x| model.predict(x)).collect();
        let report = ClassificationReport::new(&test_predictions, &test_labels, &registry);
        info!("Training accuracy: {:.4}", train_accuracy);
        info!("Test accuracy: {:.4}", report.accuracy);

        let cross_validation = evaluation::cross_validate(
            &all_features,
            &labels,
            vectorizer.len(),
            &registry,
            &config,
        )?;

        let metrics = TrainingMetrics {
            train_accuracy,
            test_accuracy: report.accuracy,
            cross_validation,
            report,
            training_samples: records.len(),
            train_size: split.train.len(),
            test_size: split.test.len(),
            fit,
        };

        Ok(Categorizer::new(registry, config, vectorizer, model, metrics))
    }
}
