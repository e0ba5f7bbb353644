//! Transaction records and the text document built from each one.

use serde::{Deserialize, Serialize};

use crate::classifier::{CategorizerError, Result};

/// Coarse spend-size token appended to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountBucket {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl AmountBucket {
    /// Maps an amount to its bucket. Lower bounds are inclusive.
    pub fn from_amount(amount: f64) -> Self {
        if amount < 100.0 {
            Self::Tiny
        } else if amount < 500.0 {
            Self::Small
        } else if amount < 1000.0 {
            Self::Medium
        } else if amount < 5000.0 {
            Self::Large
        } else {
            Self::Huge
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Tiny => "tiny_amount",
            Self::Small => "small_amount",
            Self::Medium => "medium_amount",
            Self::Large => "large_amount",
            Self::Huge => "huge_amount",
        }
    }
}

/// A single transaction as read from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub description: String,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

impl TransactionRecord {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            merchant: None,
            amount: None,
        }
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Rejects negative or non-finite amounts.
    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CategorizerError::SchemaValidation(format!(
                    "amount must be a non-negative number, got {} for '{}'",
                    amount, self.description
                )));
            }
        }
        Ok(())
    }

    /// Builds the text document fed to the vectorizer.
    ///
    /// Present, non-empty fields are joined with a single space in the order description,
    /// merchant, amount bucket. A NaN amount counts as absent.
    pub fn document(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if !self.description.is_empty() {
            parts.push(&self.description);
        }
        if let Some(merchant) = self.merchant.as_deref().filter(|m| !m.is_empty()) {
            parts.push(merchant);
        }
        if let Some(amount) = self.amount.filter(|a| !a.is_nan()) {
            parts.push(AmountBucket::from_amount(amount).token());
        }
        parts.join(" ")
    }
}

/// A transaction paired with its training label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub record: TransactionRecord,
    pub category: String,
}

impl LabeledRecord {
    pub fn new(record: TransactionRecord, category: impl Into<String>) -> Self {
        Self {
            record,
            category: category.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        let cases = [
            (0.0, "tiny_amount"),
            (99.99, "tiny_amount"),
            (100.0, "small_amount"),
            (499.99, "small_amount"),
            (500.0, "medium_amount"),
            (999.99, "medium_amount"),
            (1000.0, "large_amount"),
            (4999.99, "large_amount"),
            (5000.0, "huge_amount"),
            (1.0e9, "huge_amount"),
        ];
        for (amount, token) in cases {
            assert_eq!(AmountBucket::from_amount(amount).token(), token, "amount {}", amount);
        }
    }

    #[test]
    fn test_document_joins_present_fields() {
        let record = TransactionRecord::new("Swiggy food delivery bangalore biryani")
            .with_merchant("Swiggy")
            .with_amount(450.0);
        assert_eq!(
            record.document(),
            "Swiggy food delivery bangalore biryani Swiggy small_amount"
        );
    }

    #[test]
    fn test_document_skips_missing_fields() {
        assert_eq!(TransactionRecord::new("Uber ride").document(), "Uber ride");
        let record = TransactionRecord::new("Uber ride").with_merchant("");
        assert_eq!(record.document(), "Uber ride");
        let record = TransactionRecord::new("").with_amount(20.0);
        assert_eq!(record.document(), "tiny_amount");
        let record = TransactionRecord::new("Uber ride").with_amount(f64::NAN);
        assert_eq!(record.document(), "Uber ride");
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        assert!(TransactionRecord::new("refund").with_amount(-5.0).validate().is_err());
        assert!(TransactionRecord::new("ok").with_amount(0.0).validate().is_ok());
        assert!(TransactionRecord::new("ok").validate().is_ok());
    }
}
