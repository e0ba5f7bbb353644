//! A spend-categorization trainer: TF-IDF features over transaction text and a multinomial
//! logistic regression, exported as a portable JSON artifact.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spend_classifier::{dataset, Categorizer, TransactionRecord};
//!
//! let categorizer = Categorizer::builder()
//!     .add_records(dataset::load_csv("transactions.csv")?)?
//!     .build()?;
//!
//! let record = TransactionRecord::new("Swiggy food delivery")
//!     .with_merchant("Swiggy")
//!     .with_amount(320.0);
//! let (category, scores) = categorizer.predict(&record)?;
//! println!("Predicted category: {}", category);
//!
//! categorizer.export("model.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Scoring from the artifact
//!
//! The exported JSON is all an inference engine needs. [`ArtifactScorer`] rebuilds the
//! pipeline from it:
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spend_classifier::{ModelArtifact, TransactionRecord};
//!
//! let scorer = ModelArtifact::load("model.json")?.scorer()?;
//! let category = scorer.predict(&TransactionRecord::new("Uber ride airport cab"))?;
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod categories;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod evaluation;
pub mod record;
pub mod vectorizer;

pub use artifact::{ArtifactScorer, ModelArtifact};
pub use categories::CategoryRegistry;
pub use classifier::{Categorizer, CategorizerBuilder, CategorizerError, CategorizerInfo};
pub use config::{ClassWeight, TrainingConfig, VectorizerConfig};
pub use record::{AmountBucket, LabeledRecord, TransactionRecord};
pub use vectorizer::{SparseVector, TfidfVectorizer};

pub fn init_logger() {
    env_logger::init();
}
