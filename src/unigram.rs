//! Smoothed unigram distribution and negative sampling.

use std::collections::{BTreeMap, BTreeSet};

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{Result, Word2VecError};
use crate::text::Corpus;
use crate::vocab::Vocabulary;

/// Exponent applied to raw counts before normalizing.
pub const SMOOTHING_POWER: f64 = 0.75;

/// `p(i) = count(i)^0.75 / Σ count^0.75` for every vocabulary index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnigramDistribution {
    counts: Vec<u64>,
    probabilities: Vec<f64>,
}

impl UnigramDistribution {
    pub fn from_corpus(corpus: &Corpus, vocab: &Vocabulary) -> Self {
        let mut counts = vec![0u64; vocab.len()];
        for token in corpus.tokens() {
            if let Some(i) = vocab.index_of(token) {
                counts[i] += 1;
            }
        }
        Self::from_counts(counts)
    }

    pub fn from_counts(counts: Vec<u64>) -> Self {
        let smoothed: Vec<f64> = counts
            .iter()
            .map(|&c| (c as f64).powf(SMOOTHING_POWER))
            .collect();
        let total: f64 = smoothed.iter().sum();
        let probabilities = if total > 0.0 {
            smoothed.into_iter().map(|p| p / total).collect()
        } else {
            vec![0.0; counts.len()]
        };
        UnigramDistribution {
            counts,
            probabilities,
        }
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Raw number of occurrences of word `i`.
    pub fn count(&self, i: usize) -> u64 {
        self.counts[i]
    }

    pub fn probability(&self, i: usize) -> f64 {
        self.probabilities[i]
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of words that can actually be drawn.
    pub fn support(&self) -> usize {
        self.probabilities.iter().filter(|&&p| p > 0.0).count()
    }

    /// The index→probability mapping as an ordered map.
    pub fn to_map(&self) -> BTreeMap<usize, f64> {
        self.probabilities.iter().copied().enumerate().collect()
    }
}

/// Draws negative samples from a [`UnigramDistribution`], rejecting words in
/// the current context.
#[derive(Debug, Clone)]
pub struct NegativeSampler {
    dist: WeightedIndex<f64>,
    num_words: usize,
    max_draws: usize,
}

impl NegativeSampler {
    /// `max_draws` caps the number of draws made by a single call to
    /// [`sample`](Self::sample).
    pub fn new(distribution: &UnigramDistribution, max_draws: usize) -> Result<Self> {
        Ok(NegativeSampler {
            dist: WeightedIndex::new(distribution.probabilities())?,
            num_words: distribution.len(),
            max_draws,
        })
    }

    /// Fill `out` with exactly `k` indices drawn with replacement, none of
    /// them in `context`.
    ///
    /// Fails with `InsufficientVocabularyForNegativeSampling` once the draw
    /// budget is spent.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        context: &BTreeSet<usize>,
        k: usize,
        out: &mut Vec<usize>,
    ) -> Result<()> {
        out.clear();
        let mut attempts = 0;
        while out.len() < k {
            if attempts == self.max_draws {
                return Err(Word2VecError::InsufficientVocabularyForNegativeSampling {
                    vocab_size: self.num_words,
                    context_size: context.len(),
                    negative_samples: k,
                });
            }
            attempts += 1;
            let i = self.dist.sample(rng);
            if !context.contains(&i) {
                out.push(i);
            }
        }
        Ok(())
    }
}
