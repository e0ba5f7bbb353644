use crate::classifier::{CategorizerError, Result};

/// How per-sample loss weights are derived from label frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassWeight {
    /// Each sample weighs `n_samples / (n_classes * count(class))`
    #[default]
    Balanced,
    /// Every sample weighs 1.0
    Uniform,
}

/// Vocabulary pruning limits.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerConfig {
    min_df: usize,
    max_df: f64,
    max_features: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_df: 2,
            max_df: 0.8,
            max_features: 1000,
        }
    }
}

impl VectorizerConfig {
    /// Minimum number of training documents a feature must appear in.
    pub fn min_df(&self) -> usize {
        self.min_df
    }

    /// Maximum fraction of training documents a feature may appear in.
    pub fn max_df(&self) -> f64 {
        self.max_df
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn with_min_df(mut self, min_df: usize) -> Result<Self> {
        if min_df < 1 {
            return Err(CategorizerError::Validation("min_df must be at least 1".into()));
        }
        self.min_df = min_df;
        Ok(self)
    }

    pub fn with_max_df(mut self, max_df: f64) -> Result<Self> {
        if !(max_df > 0.0 && max_df <= 1.0) {
            return Err(CategorizerError::Validation(
                "max_df must be in (0, 1]".into(),
            ));
        }
        self.max_df = max_df;
        Ok(self)
    }

    pub fn with_max_features(mut self, max_features: usize) -> Result<Self> {
        if max_features < 1 {
            return Err(CategorizerError::Validation(
                "max_features must be at least 1".into(),
            ));
        }
        self.max_features = max_features;
        Ok(self)
    }
}

/// Immutable training parameters, fixed before any fitting starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    c: f64,
    max_iterations: usize,
    epsilon: f64,
    class_weight: ClassWeight,
    test_ratio: f64,
    seed: u64,
    cv_folds: usize,
    top_features: usize,
    vectorizer: VectorizerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iterations: 1000,
            epsilon: 1e-5,
            class_weight: ClassWeight::Balanced,
            test_ratio: 0.2,
            seed: 42,
            cv_folds: 5,
            top_features: 5,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Inverse L2 regularization strength.
    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Gradient-norm convergence threshold for L-BFGS.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn class_weight(&self) -> ClassWeight {
        self.class_weight
    }

    /// Fraction of each category held out for testing.
    pub fn test_ratio(&self) -> f64 {
        self.test_ratio
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn cv_folds(&self) -> usize {
        self.cv_folds
    }

    /// Number of features reported per category by the diagnostic.
    pub fn top_features(&self) -> usize {
        self.top_features
    }

    pub fn vectorizer(&self) -> &VectorizerConfig {
        &self.vectorizer
    }

    pub fn with_c(mut self, c: f64) -> Result<Self> {
        if !(c > 0.0 && c.is_finite()) {
            return Err(CategorizerError::Validation(
                "C must be a positive finite number".into(),
            ));
        }
        self.c = c;
        Ok(self)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Result<Self> {
        if max_iterations < 1 {
            return Err(CategorizerError::Validation(
                "max_iterations must be at least 1".into(),
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !(epsilon > 0.0) {
            return Err(CategorizerError::Validation("epsilon must be positive".into()));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_test_ratio(mut self, test_ratio: f64) -> Result<Self> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(CategorizerError::Validation(
                "test_ratio must be in (0, 1)".into(),
            ));
        }
        self.test_ratio = test_ratio;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cv_folds(mut self, cv_folds: usize) -> Result<Self> {
        if cv_folds < 2 {
            return Err(CategorizerError::Validation(
                "cv_folds must be at least 2".into(),
            ));
        }
        self.cv_folds = cv_folds;
        Ok(self)
    }

    pub fn with_top_features(mut self, top_features: usize) -> Self {
        self.top_features = top_features;
        self
    }

    pub fn with_vectorizer(mut self, vectorizer: VectorizerConfig) -> Self {
        self.vectorizer = vectorizer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.c(), 1.0);
        assert_eq!(config.max_iterations(), 1000);
        assert_eq!(config.class_weight(), ClassWeight::Balanced);
        assert_eq!(config.test_ratio(), 0.2);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.cv_folds(), 5);
        assert_eq!(config.vectorizer().min_df(), 2);
        assert_eq!(config.vectorizer().max_df(), 0.8);
        assert_eq!(config.vectorizer().max_features(), 1000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(TrainingConfig::default().with_c(0.0).is_err());
        assert!(TrainingConfig::default().with_c(f64::INFINITY).is_err());
        assert!(TrainingConfig::default().with_max_iterations(0).is_err());
        assert!(TrainingConfig::default().with_test_ratio(1.0).is_err());
        assert!(TrainingConfig::default().with_cv_folds(1).is_err());
        assert!(VectorizerConfig::default().with_max_df(0.0).is_err());
        assert!(VectorizerConfig::default().with_min_df(0).is_err());
        assert!(VectorizerConfig::default().with_max_features(0).is_err());
    }

    #[test]
    fn test_builder_chain() -> Result<()> {
        let config = TrainingConfig::default()
            .with_c(0.5)?
            .with_seed(7)
            .with_class_weight(ClassWeight::Uniform)
            .with_vectorizer(VectorizerConfig::default().with_max_features(50)?);
        assert_eq!(config.c(), 0.5);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.class_weight(), ClassWeight::Uniform);
        assert_eq!(config.vectorizer().max_features(), 50);
        Ok(())
    }
}
