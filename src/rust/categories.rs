//! The closed set of spending categories a model may be trained on or predict.

use std::collections::HashSet;

use crate::classifier::{CategorizerError, Result};

/// Labels used by the mobile app, in display order.
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "Food & Dining",
    "Groceries",
    "Transportation",
    "Shopping",
    "Bills & Utilities",
    "Entertainment",
    "Health & Fitness",
    "Education",
    "Travel",
    "Personal Care",
    "Investments",
    "Other",
];

/// An ordered, closed set of category labels.
///
/// Every component that validates or emits a label takes a registry explicitly. Labels
/// outside the registry are never added at training time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    labels: Vec<String>,
}

impl CategoryRegistry {
    /// Creates a registry from custom labels.
    ///
    /// # Errors
    /// - `Validation` if the list is empty, or contains an empty or duplicate label
    pub fn new(labels: Vec<impl Into<String>>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(CategorizerError::Validation(
                "Category registry cannot be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if label.is_empty() {
                return Err(CategorizerError::Validation(
                    "Category label cannot be empty".into(),
                ));
            }
            if !seen.insert(label.as_str()) {
                return Err(CategorizerError::Validation(format!(
                    "Duplicate category label '{}'",
                    label
                )));
            }
        }
        Ok(Self { labels })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Position of `label` in registry order.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the labels of `observed` in registry order, dropping anything unknown and
    /// any duplicates.
    pub fn ordered_subset<'a, I>(&self, observed: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = observed.into_iter().collect();
        self.labels
            .iter()
            .filter(|l| present.contains(l.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            labels: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_twelve_labels() {
        let registry = CategoryRegistry::default();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.position("Food & Dining"), Some(0));
        assert_eq!(registry.position("Other"), Some(11));
        assert!(!registry.contains("Rent"));
    }

    #[test]
    fn test_custom_registry_validation() {
        assert!(CategoryRegistry::new(Vec::<String>::new()).is_err());
        assert!(CategoryRegistry::new(vec!["a", ""]).is_err());
        assert!(CategoryRegistry::new(vec!["a", "a"]).is_err());
        let registry = CategoryRegistry::new(vec!["Coffee", "Rent"]).unwrap();
        assert!(registry.contains("Rent"));
        assert!(!registry.contains("Groceries"));
    }

    #[test]
    fn test_ordered_subset_follows_registry_order() {
        let registry = CategoryRegistry::default();
        let subset = registry.ordered_subset(vec!["Other", "Groceries", "Rent", "Groceries"]);
        assert_eq!(subset, vec!["Groceries".to_string(), "Other".to_string()]);
    }
}
