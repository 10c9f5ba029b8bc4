//! Skip-gram training instances.

use std::collections::{BTreeSet, VecDeque};

use crate::text::Corpus;
use crate::vocab::Vocabulary;

/// A target word and the distinct words around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingInstance {
    pub target: usize,
    /// Vocabulary indices within the window, excluding the target position.
    /// Ordered, so training visits context words in a reproducible order.
    pub context: BTreeSet<usize>,
}

/// One instance per token position of every sentence with at least two tokens.
///
/// Output order is document, sentence, position.
pub fn generate_instances(
    corpus: &Corpus,
    vocab: &Vocabulary,
    context_size: usize,
) -> Vec<TrainingInstance> {
    let mut out = Vec::with_capacity(corpus.num_tokens());
    for sentence in corpus.sentences() {
        if sentence.len() > 1 {
            sentence_instances(&vocab.encode(sentence), context_size, &mut out);
        }
    }
    out
}

/// Slide a window of radius `context_size` over `ids`.
///
/// `left` holds the indices at positions `[k - context_size, k)` and `right`
/// those at `(k, k + context_size]`, both clipped to the sentence. Each step
/// moves at most one element into and one out of each deque.
fn sentence_instances(ids: &[usize], context_size: usize, out: &mut Vec<TrainingInstance>) {
    let n = ids.len();
    let mut left: VecDeque<usize> = VecDeque::with_capacity(context_size.min(n));
    let mut right: VecDeque<usize> = ids[1..=context_size.min(n - 1)].iter().copied().collect();

    for k in 0..n {
        if k > 0 && context_size > 0 {
            left.push_back(ids[k - 1]);
            if left.len() > context_size {
                left.pop_front();
            }
            right.pop_front();
            if context_size < n - k {
                right.push_back(ids[k + context_size]);
            }
        }
        out.push(TrainingInstance {
            target: ids[k],
            context: left.iter().chain(right.iter()).copied().collect(),
        });
    }
}

/// Size of the largest context set in `instances`.
pub fn max_context_len(instances: &[TrainingInstance]) -> usize {
    instances
        .iter()
        .map(|inst| inst.context.len())
        .max()
        .unwrap_or(0)
}
