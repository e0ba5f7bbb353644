//! Text analysis shared by fitting, transforming and artifact scoring.
//!
//! The pipeline is:
//! 1. Lowercase, NFKD-decompose and drop combining marks
//! 2. Extract maximal runs of word characters with at least [`MIN_TOKEN_LEN`] characters
//! 3. Drop English stop words
//! 4. Emit every unigram, then every adjacent bigram joined by a single space
//!
//! Step 1 drops every character whose Unicode General_Category is Mark (Mn, Mc or Me). This is
//! not the same as dropping characters with a non-zero canonical combining class: spacing marks
//! such as Devanagari vowel signs have class 0 but are still removed.
//!
//! None of these rules are stored in the model artifact, so they are constants.

use lazy_static::lazy_static;
use regex::Regex;
use tokenizers::normalizers::{Lowercase, StripAccents, NFKD};
use tokenizers::{NormalizedString, Normalizer};

use super::stop_words::is_stop_word;
use crate::classifier::{CategorizerError, Result};

pub const MIN_TOKEN_LEN: usize = 3;
pub const MAX_NGRAM: usize = 2;

lazy_static! {
    static ref TOKEN_PATTERN: Regex =
        Regex::new(&format!(r"\w{{{},}}", MIN_TOKEN_LEN)).expect("token pattern is valid");
}

/// Lowercases the text and strips accent marks.
pub fn normalize(text: &str) -> Result<String> {
    let steps: [&dyn Normalizer; 3] = [&Lowercase, &NFKD, &StripAccents];
    let mut normalized = NormalizedString::from(text);
    for step in steps {
        step.normalize(&mut normalized)
            .map_err(|e| CategorizerError::Tokenizer(e.to_string()))?;
    }
    Ok(normalized.get().to_string())
}

/// Splits normalized text into word tokens, without stop-word filtering.
pub fn tokenize(normalized: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(normalized).map(|m| m.as_str()).collect()
}

/// Produces the candidate features of a document: unigrams followed by bigrams.
pub fn analyze(document: &str) -> Result<Vec<String>> {
    let normalized = normalize(document)?;
    let tokens: Vec<&str> = tokenize(&normalized)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut features: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    for n in 2..=MAX_NGRAM {
        features.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    Ok(features)
}
