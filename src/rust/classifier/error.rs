use std::io;

/// Represents the different types of errors that can occur while training or exporting
/// a transaction categorizer.
#[derive(Debug, thiserror::Error)]
pub enum CategorizerError {
    /// Input is missing a required column or carries a malformed value
    #[error("Schema validation error: {0}")]
    SchemaValidation(String),
    /// The labeled corpus cannot produce a usable model
    #[error("Training data error: {0}")]
    TrainingData(String),
    /// A category has too few examples for a stratified split
    #[error("Insufficient data: category '{category}' has {count} example(s), at least 2 are required")]
    InsufficientData { category: String, count: usize },
    /// The model artifact could not be serialized or written
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A loaded model artifact is not internally consistent
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
    /// Text normalization failed
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
    /// A configuration value is out of range
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CategorizerError>;
