//! Error types for word-vector training.

use rand::distributions::WeightedError;
use thiserror::Error;

/// Everything that can go wrong between a raw corpus and trained vectors.
#[derive(Error, Debug)]
pub enum Word2VecError {
    /// A hyperparameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No token survived normalization.
    #[error("empty vocabulary: no tokens survived normalization")]
    EmptyVocabulary,

    /// Negative samples could not be collected outside some context set:
    /// either the set covers every drawable word, or the words left over are
    /// so rare that the draw budget ran out.
    #[error(
        "vocabulary of {vocab_size} words is too small to draw {negative_samples} \
         negative samples outside a context set of {context_size} words"
    )]
    InsufficientVocabularyForNegativeSampling {
        vocab_size: usize,
        context_size: usize,
        negative_samples: usize,
    },

    /// The unigram weights could not be turned into a sampling distribution.
    #[error("invalid sampling distribution: {0}")]
    InvalidDistribution(#[from] WeightedError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("configuration file error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Word2VecError>;
