pub mod analyzer;
mod sparse;
pub mod stop_words;
mod tfidf;

pub use analyzer::analyze;
pub use sparse::SparseVector;
pub use tfidf::TfidfVectorizer;
