//! Word/index bijection.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Index;

use crate::text::{Corpus, Sentence};

/// The distinct words of a corpus, indexed by their position in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    /// Sorted, no duplicates. `words[i]` is the word with index `i`.
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let distinct: BTreeSet<&str> = corpus.tokens().collect();
        Self::from_sorted(distinct.into_iter().map(str::to_string).collect())
    }

    fn from_sorted(words: Vec<String>) -> Self {
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
        Vocabulary { words, index }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Get the index for a word. Exact match only, case-sensitive.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Get the word for an index, or `None` if out of range.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Map every token of a sentence to its index.
    ///
    /// *Panics* if the sentence contains a word that isn't in the vocabulary;
    /// sentences must come from the corpus the vocabulary was built from.
    pub fn encode(&self, sentence: &Sentence) -> Vec<usize> {
        sentence
            .iter()
            .map(|w| {
                self.index_of(w)
                    .unwrap_or_else(|| panic!("word {w:?} missing from vocabulary"))
            })
            .collect()
    }

    /// The word→index mapping as an ordered map.
    pub fn to_map(&self) -> BTreeMap<String, usize> {
        self.words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect()
    }
}

impl Index<usize> for Vocabulary {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        &self.words[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Normalizer;

    fn vocab_of(lines: &[&str]) -> Vocabulary {
        let corpus = Normalizer::default().normalize_corpus(&[lines]);
        Vocabulary::from_corpus(&corpus)
    }

    #[test]
    fn test_sorted_indices() {
        let vocab = vocab_of(&["the quick brown fox"]);
        assert_eq!(vocab.words(), &["brown", "fox", "quick", "the"]);
        assert_eq!(vocab.index_of("brown"), Some(0));
        assert_eq!(vocab.index_of("the"), Some(3));
        assert_eq!(vocab.index_of("cat"), None);
        assert_eq!(&vocab[2], "quick");
    }

    #[test]
    fn test_duplicates_across_sentences() {
        let vocab = vocab_of(&["b a", "a c b", "c"]);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.words(), &["a", "b", "c"]);
    }

    #[test]
    fn test_empty_corpus() {
        let vocab = vocab_of(&["", " ,. "]);
        assert!(vocab.is_empty());
        assert_eq!(vocab.word(0), None);
        assert!(vocab.to_map().is_empty());
    }

    #[test]
    fn test_encode() {
        let vocab = vocab_of(&["b a b"]);
        let sentence: Sentence = vec!["b".into(), "a".into(), "b".into()];
        assert_eq!(vocab.encode(&sentence), vec![1, 0, 1]);
    }
}
