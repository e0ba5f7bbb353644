use std::collections::HashMap;

use log::{debug, info};

use super::analyzer::analyze;
use super::sparse::SparseVector;
use crate::classifier::{CategorizerError, Result};
use crate::config::VectorizerConfig;

/// Corpus statistics for one candidate feature, kept in first-occurrence order.
struct FeatureStats {
    term: String,
    document_frequency: usize,
    term_frequency: usize,
}

/// TF-IDF vectorizer with a frozen vocabulary.
///
/// Weights are `(1 + ln tf) * idf`, L2-normalized per document, where
/// `idf = ln((1 + n) / (1 + df)) + 1` over the `n` fitting documents.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and IDF table on training documents.
    ///
    /// Features are kept when `min_df <= df <= max_df * n`. If more than `max_features`
    /// survive, the most frequent ones (by total count over the corpus) are kept, earlier
    /// first occurrence winning ties. The vocabulary is stored in that ranking order.
    ///
    /// # Errors
    /// - `TrainingData` if `documents` is empty or no feature survives pruning
    pub fn fit<S: AsRef<str>>(documents: &[S], config: &VectorizerConfig) -> Result<Self> {
        if documents.is_empty() {
            return Err(CategorizerError::TrainingData(
                "Cannot fit vectorizer on an empty corpus".into(),
            ));
        }

        let mut stats: Vec<FeatureStats> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let mut seen_in_doc: Vec<bool> = vec![false; stats.len()];
            for feature in analyze(document.as_ref())? {
                let pos = match positions.get(&feature) {
                    Some(&pos) => pos,
                    None => {
                        let pos = stats.len();
                        positions.insert(feature.clone(), pos);
                        stats.push(FeatureStats {
                            term: feature,
                            document_frequency: 0,
                            term_frequency: 0,
                        });
                        seen_in_doc.push(false);
                        pos
                    }
                };
                let entry = &mut stats[pos];
                entry.term_frequency += 1;
                if !seen_in_doc[pos] {
                    seen_in_doc[pos] = true;
                    entry.document_frequency += 1;
                }
            }
        }

        let n_docs = documents.len();
        let max_doc_count = config.max_df() * n_docs as f64;
        let candidates = stats.len();
        let mut kept: Vec<FeatureStats> = stats
            .into_iter()
            .filter(|s| {
                s.document_frequency >= config.min_df()
                    && s.document_frequency as f64 <= max_doc_count
            })
            .collect();
        debug!(
            "{} of {} candidate features within document-frequency bounds",
            kept.len(),
            candidates
        );

        if kept.is_empty() {
            return Err(CategorizerError::TrainingData(format!(
                "No features remain after pruning (min_df={}, max_df={}, {} documents)",
                config.min_df(),
                config.max_df(),
                n_docs
            )));
        }

        // Stable sort keeps first-occurrence order among equal counts.
        kept.sort_by(|a, b| b.term_frequency.cmp(&a.term_frequency));
        kept.truncate(config.max_features());

        let n = n_docs as f64;
        let idf = kept
            .iter()
            .map(|s| ((1.0 + n) / (1.0 + s.document_frequency as f64)).ln() + 1.0)
            .collect();
        let vocabulary: Vec<String> = kept.into_iter().map(|s| s.term).collect();

        info!("Vocabulary size: {}", vocabulary.len());
        Self::from_parts(vocabulary, idf)
    }

    /// Rebuilds a fitted vectorizer from a vocabulary and its aligned IDF table.
    ///
    /// # Errors
    /// - `InvalidArtifact` on length mismatch, duplicate features or non-finite IDF values
    pub fn from_parts(vocabulary: Vec<String>, idf: Vec<f64>) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(CategorizerError::InvalidArtifact(format!(
                "Vocabulary has {} entries but IDF table has {}",
                vocabulary.len(),
                idf.len()
            )));
        }
        if let Some(pos) = idf.iter().position(|v| !v.is_finite()) {
            return Err(CategorizerError::InvalidArtifact(format!(
                "IDF value for '{}' is not finite",
                vocabulary[pos]
            )));
        }
        let mut index = HashMap::with_capacity(vocabulary.len());
        for (i, term) in vocabulary.iter().enumerate() {
            if index.insert(term.clone(), i).is_some() {
                return Err(CategorizerError::InvalidArtifact(format!(
                    "Duplicate vocabulary entry '{}'",
                    term
                )));
            }
        }
        Ok(Self {
            vocabulary,
            index,
            idf,
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    pub fn feature_index(&self, feature: &str) -> Option<usize> {
        self.index.get(feature).copied()
    }

    /// Converts one document into its normalized TF-IDF vector. Out-of-vocabulary features
    /// are ignored; a document with no known feature yields an empty vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for feature in analyze(document)? {
            if let Some(&i) = self.index.get(&feature) {
                *counts.entry(i).or_insert(0) += 1;
            }
        }
        let pairs = counts
            .into_iter()
            .map(|(i, tf)| (i, (1.0 + (tf as f64).ln()) * self.idf[i]))
            .collect();
        let mut vector = SparseVector::from_pairs(pairs);
        vector.l2_normalize();
        Ok(vector)
    }

    pub fn transform_all<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<SparseVector>> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }
}
