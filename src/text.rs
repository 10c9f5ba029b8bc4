//! Turning raw lines into token sequences.

use std::collections::HashSet;

/// Characters that separate words, in addition to whitespace.
pub const DELIMITERS: &str = " \r\n\t`~!@#$%^&*()-+=[]{}|\\;:'\",<.>/?";

/// The tokens of one raw line.
pub type Sentence = Vec<String>;

/// A normalized corpus: documents, each a list of sentences (one per raw line).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Vec<Sentence>>,
}

impl Corpus {
    pub fn documents(&self) -> &[Vec<Sentence>] {
        &self.documents
    }

    /// All sentences in document order.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.documents.iter().flatten()
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.sentences().flatten().map(String::as_str)
    }

    pub fn num_tokens(&self) -> usize {
        self.sentences().map(Vec::len).sum()
    }
}

impl From<Vec<Vec<Sentence>>> for Corpus {
    fn from(documents: Vec<Vec<Sentence>>) -> Self {
        Corpus { documents }
    }
}

/// Lowercases, splits and filters raw text.
///
/// Stop words are lowercased once, up front, so comparison is effectively
/// case-insensitive. No stemming is done.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    stop_words: HashSet<String>,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || DELIMITERS.contains(c)
}

impl Normalizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Normalizer {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Split one raw line into tokens.
    ///
    /// Runs of delimiters produce empty pieces, which are dropped along with
    /// anything that is empty after trimming.
    pub fn normalize_line(&self, line: &str) -> Sentence {
        line.split(is_delimiter)
            .map(str::to_lowercase)
            .filter(|word| !self.is_stop_word(word))
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Normalize every line of every document. Each line becomes one
    /// sentence, even if it ends up empty.
    pub fn normalize_corpus<D, L>(&self, documents: &[D]) -> Corpus
    where
        D: AsRef<[L]>,
        L: AsRef<str>,
    {
        documents
            .iter()
            .map(|doc| {
                doc.as_ref()
                    .iter()
                    .map(|line| self.normalize_line(line.as_ref()))
                    .collect()
            })
            .collect::<Vec<Vec<Sentence>>>()
            .into()
    }
}
