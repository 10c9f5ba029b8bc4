//! Skip-gram word embeddings trained with negative sampling.
//!
//! The pipeline is strictly sequential:
//!
//! 1. [`text`] lowercases and splits raw lines, dropping stop words;
//! 2. [`vocab`] assigns each distinct token its rank in sorted order;
//! 3. [`unigram`] counts tokens and smooths the counts with a 0.75 power;
//! 4. [`pairs`] turns every token position into a (target, context set) instance;
//! 5. [`trainer`] runs adaptive SGD over the shuffled instances.
//!
//! ```rust,ignore
//! use skipgram::{generate_word_vectors, TrainingConfig};
//!
//! let corpus = vec![vec!["The quick brown fox jumps over the lazy dog"]];
//! let config = TrainingConfig { vector_size: 50, seed: Some(1), ..TrainingConfig::default() };
//! let vectors = generate_word_vectors(&corpus, &["the"], &config)?;
//! println!("{:?}", vectors.most_similar("fox", 3));
//! ```

use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod config;
pub mod embedding;
pub mod error;
pub mod pairs;
pub mod text;
pub mod trainer;
pub mod unigram;
pub mod vectors;
pub mod vocab;

pub use config::{GradientReset, TrainingConfig};
pub use embedding::EmbeddingTable;
pub use error::{Result, Word2VecError};
pub use pairs::TrainingInstance;
pub use text::{Corpus, Normalizer};
pub use trainer::{EpochStats, Trainer};
pub use unigram::UnigramDistribution;
pub use vectors::{WordVectors, WordVectorsRecord};
pub use vocab::Vocabulary;

/// Train word vectors on `documents`, each a list of raw lines.
///
/// Randomness comes from `config.seed` if set, otherwise from the OS.
pub fn generate_word_vectors<D, L, S>(
    documents: &[D],
    stop_words: &[S],
    config: &TrainingConfig,
) -> Result<WordVectors>
where
    D: AsRef<[L]>,
    L: AsRef<str>,
    S: AsRef<str>,
{
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    generate_word_vectors_with_rng(documents, stop_words, config, &mut rng, |_| {})
}

/// Like [`generate_word_vectors`], but with a caller-supplied generator and a
/// callback run after each epoch. `config.seed` is ignored.
pub fn generate_word_vectors_with_rng<D, L, S, R, F>(
    documents: &[D],
    stop_words: &[S],
    config: &TrainingConfig,
    rng: &mut R,
    on_epoch: F,
) -> Result<WordVectors>
where
    D: AsRef<[L]>,
    L: AsRef<str>,
    S: AsRef<str>,
    R: Rng + ?Sized,
    F: FnMut(&EpochStats),
{
    config.validate()?;

    let corpus = Normalizer::new(stop_words).normalize_corpus(documents);
    let vocab = Vocabulary::from_corpus(&corpus);
    if vocab.is_empty() {
        return Err(Word2VecError::EmptyVocabulary);
    }
    let distribution = UnigramDistribution::from_corpus(&corpus, &vocab);
    info!(
        "vocabulary: {} words from {} tokens",
        vocab.len(),
        corpus.num_tokens()
    );

    let mut instances = pairs::generate_instances(&corpus, &vocab, config.context_size);
    drop(corpus);
    if instances.is_empty() {
        warn!("no sentence has two or more tokens; embeddings will stay at their initial values");
    }
    info!(
        "{} training instances, widest context {} words",
        instances.len(),
        pairs::max_context_len(&instances)
    );

    let input = EmbeddingTable::random(vocab.len(), config.vector_size, rng);
    let output = EmbeddingTable::random(vocab.len(), config.vector_size, rng);

    let mut trainer = Trainer::new(input, output, &distribution, config)?;
    trainer.check_feasible(&instances, distribution.support())?;
    trainer.train(&mut instances, config.num_epochs, rng, on_epoch)?;

    Ok(WordVectors::new(vocab, distribution, trainer.into_embeddings()))
}
