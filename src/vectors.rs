//! Trained word vectors and queries over them.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use ndarray::prelude::*;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::embedding::{norm, EmbeddingTable};
use crate::unigram::UnigramDistribution;
use crate::vocab::Vocabulary;

/// Everything a training run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct WordVectors {
    vocab: Vocabulary,
    distribution: UnigramDistribution,
    /// Row `i` is the input-side embedding of word `i`.
    embeddings: EmbeddingTable,
}

/// Plain-data view of [`WordVectors`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordVectorsRecord {
    pub words: BTreeMap<String, usize>,
    pub word_freq: BTreeMap<usize, f64>,
    pub input_vectors: BTreeMap<usize, Vec<f64>>,
}

impl WordVectors {
    pub fn new(
        vocab: Vocabulary,
        distribution: UnigramDistribution,
        embeddings: EmbeddingTable,
    ) -> Self {
        assert_eq!(vocab.len(), embeddings.num_words());
        assert_eq!(vocab.len(), distribution.len());
        WordVectors {
            vocab,
            distribution,
            embeddings,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn distribution(&self) -> &UnigramDistribution {
        &self.distribution
    }

    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }

    pub fn num_words(&self) -> usize {
        self.vocab.len()
    }

    /// Number of components in every embedding.
    pub fn size(&self) -> usize {
        self.embeddings.size()
    }

    /// Index of `word` in the vocabulary, via its hash map. Tokens were
    /// lowercased during training, so a capitalized query won't match.
    pub fn lookup_word(&self, word: &str) -> Option<usize> {
        self.vocab.index_of(word)
    }

    /// The word stored at index `word`.
    ///
    /// *Panics* if the index is not below [`num_words`](Self::num_words).
    pub fn word(&self, word: usize) -> &str {
        &self.vocab[word]
    }

    pub fn vector(&self, word: &str) -> Option<ArrayView1<'_, f64>> {
        self.lookup_word(word).map(|i| self.embeddings.row(i))
    }

    /// The `n` words closest to `word` by cosine similarity, best first.
    /// `None` if `word` is unknown.
    pub fn most_similar(&self, word: &str, n: usize) -> Option<Vec<(String, f64)>> {
        let i = self.lookup_word(word)?;
        let query = self.embeddings.row(i).to_owned();
        Some(self.nearest(query.view(), &[i], n))
    }

    /// Words completing "`a` is to `b` as `c` is to ?", ranked by cosine
    /// similarity to `b - a + c`. `None` if any input word is unknown.
    pub fn analogy(&self, a: &str, b: &str, c: &str, n: usize) -> Option<Vec<(String, f64)>> {
        let ia = self.lookup_word(a)?;
        let ib = self.lookup_word(b)?;
        let ic = self.lookup_word(c)?;
        let query = &self.embeddings.row(ib) - &self.embeddings.row(ia) + self.embeddings.row(ic);
        Some(self.nearest(query.view(), &[ia, ib, ic], n))
    }

    fn nearest(&self, query: ArrayView1<'_, f64>, exclude: &[usize], n: usize) -> Vec<(String, f64)> {
        let query_len = norm(query);
        let mut scored: Vec<(usize, f64)> = (0..self.num_words())
            .filter(|i| !exclude.contains(i))
            .map(|i| {
                let row = self.embeddings.row(i);
                let denom = query_len * norm(row);
                let sim = if denom == 0.0 { 0.0 } else { row.dot(&query) / denom };
                (i, sim)
            })
            .collect();
        scored.sort_by_key(|&(i, sim)| (Reverse(OrderedFloat(sim)), i));
        scored
            .into_iter()
            .take(n)
            .map(|(i, sim)| (self.word(i).to_string(), sim))
            .collect()
    }

    pub fn to_record(&self) -> WordVectorsRecord {
        WordVectorsRecord {
            words: self.vocab.to_map(),
            word_freq: self.distribution.to_map(),
            input_vectors: (0..self.num_words())
                .map(|i| (i, self.embeddings.row(i).to_vec()))
                .collect(),
        }
    }
}
