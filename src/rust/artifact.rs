//! The JSON model artifact shared with external inference engines.
//!
//! The artifact is self-contained: together with the fixed document and tokenization rules
//! of this crate it is enough to reproduce every prediction. [`ArtifactScorer`] is a
//! reference consumer that only reads the artifact.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::categories::CategoryRegistry;
use crate::classifier::{Categorizer, CategorizerError, LogisticRegression, Result};
use crate::record::TransactionRecord;
use crate::vectorizer::TfidfVectorizer;

pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerSection {
    /// Features in column order
    pub vocabulary: Vec<String>,
    /// `[feature, idf]` pairs, in vocabulary order
    pub idf_scores: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryParameters {
    pub weights: BTreeMap<String, f64>,
    pub bias: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSection {
    pub weights: BTreeMap<String, CategoryParameters>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Held-out test accuracy
    pub accuracy: f64,
    pub training_samples: usize,
    pub version: String,
    pub features: usize,
    pub cv_accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub vectorizer: VectorizerSection,
    pub classifier: ClassifierSection,
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn from_categorizer(categorizer: &Categorizer) -> Self {
        let vectorizer = categorizer.vectorizer();
        let model = categorizer.model();
        let metrics = categorizer.metrics();
        let vocabulary = vectorizer.vocabulary().to_vec();

        let idf_scores = vocabulary
            .iter()
            .cloned()
            .zip(vectorizer.idf().iter().copied())
            .collect();

        let weights = model
            .categories()
            .iter()
            .enumerate()
            .map(|(k, category)| {
                let row = model.weights().row(k);
                let weights = vocabulary
                    .iter()
                    .cloned()
                    .zip(row.iter().copied())
                    .collect();
                (
                    category.clone(),
                    CategoryParameters {
                        weights,
                        bias: model.bias()[k],
                    },
                )
            })
            .collect();

        Self {
            vectorizer: VectorizerSection {
                vocabulary,
                idf_scores,
            },
            classifier: ClassifierSection {
                weights,
                categories: model.categories().to_vec(),
            },
            metadata: ArtifactMetadata {
                accuracy: metrics.test_accuracy,
                training_samples: metrics.training_samples,
                version: FORMAT_VERSION.to_string(),
                features: vectorizer.len(),
                cv_accuracy: metrics.cross_validation.mean,
                train_accuracy: Some(metrics.train_accuracy),
                cv_std: Some(metrics.cross_validation.std),
                converged: Some(metrics.fit.converged),
                iterations: Some(metrics.fit.iterations),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CategorizerError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CategorizerError::InvalidArtifact(e.to_string()))
    }

    /// Serializes the artifact and writes it in one step: the JSON goes to a temporary file
    /// in the destination directory, which is then renamed over `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let serialization = |e: std::io::Error| {
            CategorizerError::Serialization(format!("Cannot write {}: {}", path.display(), e))
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(serialization)?;
        file.write_all(json.as_bytes()).map_err(serialization)?;
        file.as_file().sync_all().map_err(serialization)?;
        file.persist(path).map_err(|e| serialization(e.error))?;

        info!("Model exported to {}", path.display());
        info!("  Vocabulary size: {}", self.vectorizer.vocabulary.len());
        info!("  Categories: {}", self.classifier.categories.len());
        info!("  Model size: {:.2} KB", json.len() as f64 / 1024.0);
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Confirms every exported category belongs to `registry`.
    pub fn check_categories(&self, registry: &CategoryRegistry) -> Result<()> {
        match self.classifier.categories.iter().find(|c| !registry.contains(c)) {
            Some(unknown) => Err(CategorizerError::InvalidArtifact(format!(
                "Category '{}' is not registered",
                unknown
            ))),
            None => Ok(()),
        }
    }

    pub fn scorer(&self) -> Result<ArtifactScorer> {
        ArtifactScorer::new(self)
    }
}

/// Scores transactions using nothing but a [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct ArtifactScorer {
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
}

impl ArtifactScorer {
    /// Rebuilds the vectorizer and classifier from the artifact, matching parameters to
    /// features by name.
    ///
    /// # Errors
    /// - `InvalidArtifact` if a vocabulary entry has no IDF score, a listed category has no
    ///   parameters, or categories repeat
    pub fn new(artifact: &ModelArtifact) -> Result<Self> {
        let vocabulary = artifact.vectorizer.vocabulary.clone();
        let idf_by_name: HashMap<&str, f64> = artifact
            .vectorizer
            .idf_scores
            .iter()
            .map(|(f, idf)| (f.as_str(), *idf))
            .collect();
        let idf = vocabulary
            .iter()
            .map(|f| {
                idf_by_name.get(f.as_str()).copied().ok_or_else(|| {
                    CategorizerError::InvalidArtifact(format!("No IDF score for feature '{}'", f))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        let vectorizer = TfidfVectorizer::from_parts(vocabulary, idf)?;

        let categories = artifact.classifier.categories.clone();
        let mut seen = HashSet::new();
        if let Some(dup) = categories.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(CategorizerError::InvalidArtifact(format!(
                "Category '{}' is listed twice",
                dup
            )));
        }

        let d = vectorizer.len();
        let mut weights = Array2::<f64>::zeros((categories.len(), d));
        let mut bias = Array1::<f64>::zeros(categories.len());
        for (k, category) in categories.iter().enumerate() {
            let params = artifact.classifier.weights.get(category).ok_or_else(|| {
                CategorizerError::InvalidArtifact(format!("No parameters for category '{}'", category))
            })?;
            bias[k] = params.bias;
            for (feature, &w) in &params.weights {
                if let Some(j) = vectorizer.feature_index(feature) {
                    weights[[k, j]] = w;
                }
            }
        }
        let model = LogisticRegression::from_parts(categories, weights, bias)?;
        Ok(Self { vectorizer, model })
    }

    /// Categories with their probabilities, most probable first.
    pub fn predict_ranked(&self, record: &TransactionRecord) -> Result<Vec<(String, f64)>> {
        let x = self.vectorizer.transform(&record.document())?;
        let probabilities = self.model.predict_proba(&x);
        let mut ranked: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
        // stable: equal probabilities keep category order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked
            .into_iter()
            .map(|(k, p)| (self.model.categories()[k].clone(), p))
            .collect())
    }

    pub fn predict(&self, record: &TransactionRecord) -> Result<String> {
        let x = self.vectorizer.transform(&record.document())?;
        Ok(self.model.predict(&x).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_artifact() -> ModelArtifact {
        let json = r#"{
            "vectorizer": {
                "vocabulary": ["uber", "netflix"],
                "idf_scores": [["netflix", 1.5], ["uber", 1.2]]
            },
            "classifier": {
                "weights": {
                    "Transportation": {"weights": {"uber": 3.0, "netflix": -1.0}, "bias": 0.1},
                    "Entertainment": {"weights": {"uber": -1.0, "netflix": 3.0}, "bias": -0.1}
                },
                "categories": ["Transportation", "Entertainment"]
            },
            "metadata": {
                "accuracy": 0.9, "training_samples": 10, "version": "1.0",
                "features": 2, "cv_accuracy": 0.85, "trained_by": "someone else"
            }
        }"#;
        ModelArtifact::from_json(json).unwrap()
    }

    #[test]
    fn test_unknown_metadata_fields_tolerated() {
        let artifact = tiny_artifact();
        assert_eq!(artifact.metadata.version, "1.0");
        assert_eq!(artifact.metadata.train_accuracy, None);
    }

    #[test]
    fn test_scorer_uses_names_not_positions() -> Result<()> {
        let scorer = tiny_artifact().scorer()?;
        assert_eq!(scorer.predict(&TransactionRecord::new("Uber cab"))?, "Transportation");
        assert_eq!(scorer.predict(&TransactionRecord::new("Netflix plan"))?, "Entertainment");
        let ranked = scorer.predict_ranked(&TransactionRecord::new("Netflix plan"))?;
        assert_eq!(ranked[0].0, "Entertainment");
        assert!((ranked.iter().map(|(_, p)| p).sum::<f64>() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_missing_idf_rejected() {
        let mut artifact = tiny_artifact();
        artifact.vectorizer.idf_scores.pop();
        assert!(matches!(artifact.scorer(), Err(CategorizerError::InvalidArtifact(_))));
    }

    #[test]
    fn test_missing_category_parameters_rejected() {
        let mut artifact = tiny_artifact();
        artifact.classifier.weights.remove("Entertainment");
        assert!(matches!(artifact.scorer(), Err(CategorizerError::InvalidArtifact(_))));
    }

    #[test]
    fn test_check_categories() {
        let artifact = tiny_artifact();
        assert!(artifact.check_categories(&CategoryRegistry::default()).is_ok());
        let registry = CategoryRegistry::new(vec!["Transportation", "Other"]).unwrap();
        assert!(artifact.check_categories(&registry).is_err());
    }

    #[test]
    fn test_idf_scores_serialize_as_pairs() -> Result<()> {
        let json = tiny_artifact().to_json()?;
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vectorizer"]["idf_scores"][0][0], "netflix");
        assert_eq!(value["vectorizer"]["idf_scores"][0][1], 1.5);
        assert!(value["metadata"].get("train_accuracy").is_none());
        Ok(())
    }

    #[test]
    fn test_write_to_missing_directory_is_serialization_error() {
        let artifact = tiny_artifact();
        let err = artifact
            .write("/nonexistent-dir-for-test/model.json")
            .unwrap_err();
        assert!(matches!(err, CategorizerError::Serialization(_)));
    }
}
