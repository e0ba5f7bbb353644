pub mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod model;
pub mod trainer;
mod utils;

pub use builder::CategorizerBuilder;
pub use classifier::{Categorizer, TrainingMetrics};
pub use error::{CategorizerError, Result};
pub use model::LogisticRegression;
pub use trainer::FitReport;

/// Summary of a trained categorizer
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizerInfo {
    /// Number of categories the model can predict
    pub num_categories: usize,
    /// Predictable categories, in registry order
    pub categories: Vec<String>,
    /// Vocabulary size
    pub num_features: usize,
    /// Labeled records used for training and evaluation
    pub training_samples: usize,
    /// Accuracy on the held-out split
    pub test_accuracy: f64,
    /// Mean cross-validation accuracy
    pub cv_accuracy: f64,
}
