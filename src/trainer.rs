//! Skip-gram training with negative sampling and per-feature adaptive rates.
//!
//! For each instance `(t, C)`, `k` negatives are drawn outside `C`. Then, for
//! every context word `c` in `C`, the sigmoid responses
//! `σ(out[w] · in[t])` over the candidates `negatives ∪ {c}` are normalized
//! by their sum, and each candidate's error `prob(w) - [w == c]` is added to
//! a per-word total. Once all of `C` has been seen, the output rows of the
//! words with nonzero error and the input row of `t` are moved against their
//! gradients, each feature with its own rate `η / sqrt(Σ grad²)`.
//!
//! The error sum that drives the input update reads each output weight after
//! that weight's own update.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{GradientReset, TrainingConfig};
use crate::embedding::{sigmoid, EmbeddingTable, GradientAccumulator};
use crate::error::{Result, Word2VecError};
use crate::pairs::TrainingInstance;
use crate::unigram::{NegativeSampler, UnigramDistribution};

/// What happened during one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    /// Zero-based.
    pub epoch: usize,
    pub instances: usize,
    /// Number of output rows moved, summed over instances.
    pub output_updates: usize,
    pub elapsed: Duration,
}

/// Buffers reused across instances.
#[derive(Debug, Default)]
struct Scratch {
    negatives: Vec<usize>,
    candidates: BTreeSet<usize>,
    responses: Vec<(usize, f64)>,
    errors: BTreeMap<usize, f64>,
    weighted_error: Vec<f64>,
}

pub struct Trainer {
    input: EmbeddingTable,
    output: EmbeddingTable,
    input_grads: GradientAccumulator,
    output_grads: GradientAccumulator,
    sampler: NegativeSampler,
    negative_samples: usize,
    learning_rate: f64,
    gradient_reset: GradientReset,
    scratch: Scratch,
}

impl Trainer {
    /// Both tables must have one row per word of `distribution` and the same
    /// row size.
    pub fn new(
        input: EmbeddingTable,
        output: EmbeddingTable,
        distribution: &UnigramDistribution,
        config: &TrainingConfig,
    ) -> Result<Self> {
        config.validate()?;
        let num_words = distribution.len();
        let size = input.size();
        if input.num_words() != num_words || output.num_words() != num_words {
            return Err(Word2VecError::InvalidConfiguration(format!(
                "weight tables have {} and {} rows but the vocabulary has {num_words} words",
                input.num_words(),
                output.num_words(),
            )));
        }
        if output.size() != size {
            return Err(Word2VecError::InvalidConfiguration(format!(
                "input rows have {size} components but output rows have {}",
                output.size(),
            )));
        }
        if num_words == 0 {
            return Err(Word2VecError::EmptyVocabulary);
        }

        Ok(Trainer {
            input,
            output,
            input_grads: GradientAccumulator::new(num_words, size),
            output_grads: GradientAccumulator::new(num_words, size),
            sampler: NegativeSampler::new(distribution, config.max_negative_draws())?,
            negative_samples: config.negative_samples,
            learning_rate: config.learning_rate,
            gradient_reset: config.gradient_reset,
            scratch: Scratch {
                weighted_error: vec![0.0; size],
                ..Scratch::default()
            },
        })
    }

    /// Fail fast if some instance leaves no word to draw negatives from.
    ///
    /// Without this the rejection loop could only end by exhausting its
    /// retry budget, possibly deep into training.
    pub fn check_feasible(&self, instances: &[TrainingInstance], support: usize) -> Result<()> {
        if self.negative_samples == 0 {
            return Ok(());
        }
        match instances.iter().find(|inst| inst.context.len() >= support) {
            Some(inst) => Err(Word2VecError::InsufficientVocabularyForNegativeSampling {
                vocab_size: self.input.num_words(),
                context_size: inst.context.len(),
                negative_samples: self.negative_samples,
            }),
            None => Ok(()),
        }
    }

    pub fn input(&self) -> &EmbeddingTable {
        &self.input
    }

    pub fn output(&self) -> &EmbeddingTable {
        &self.output
    }

    /// Run `num_epochs` epochs, calling `on_epoch` after each.
    pub fn train<R, F>(
        &mut self,
        instances: &mut [TrainingInstance],
        num_epochs: usize,
        rng: &mut R,
        mut on_epoch: F,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
        F: FnMut(&EpochStats),
    {
        for epoch in 0..num_epochs {
            let stats = self.run_epoch(epoch, instances, rng)?;
            info!(
                "epoch {}/{num_epochs} done: {} instances in {:.2?}",
                epoch + 1,
                stats.instances,
                stats.elapsed
            );
            on_epoch(&stats);
        }
        Ok(())
    }

    /// One shuffled pass over `instances`.
    pub fn run_epoch<R: Rng + ?Sized>(
        &mut self,
        epoch: usize,
        instances: &mut [TrainingInstance],
        rng: &mut R,
    ) -> Result<EpochStats> {
        let start = Instant::now();
        if epoch == 0 || self.gradient_reset == GradientReset::PerEpoch {
            self.input_grads.reset();
            self.output_grads.reset();
        }
        instances.shuffle(rng);

        let mut output_updates = 0;
        for instance in instances.iter() {
            output_updates += self.train_instance(instance, rng)?;
        }
        debug!("epoch {epoch}: {output_updates} output row updates");

        Ok(EpochStats {
            epoch,
            instances: instances.len(),
            output_updates,
            elapsed: start.elapsed(),
        })
    }

    /// Returns the number of output rows updated.
    fn train_instance<R: Rng + ?Sized>(
        &mut self,
        instance: &TrainingInstance,
        rng: &mut R,
    ) -> Result<usize> {
        let target = instance.target;
        let scratch = &mut self.scratch;
        self.sampler.sample(
            rng,
            &instance.context,
            self.negative_samples,
            &mut scratch.negatives,
        )?;

        // Forward: accumulate each candidate's error over all context words.
        scratch.errors.clear();
        let input = self.input.row(target);
        for &context in &instance.context {
            scratch.candidates.clear();
            scratch.candidates.extend(scratch.negatives.iter().copied());
            scratch.candidates.insert(context);

            scratch.responses.clear();
            let mut total = 0.0;
            for &w in &scratch.candidates {
                let response = sigmoid(self.output.row(w).dot(&input));
                total += response;
                scratch.responses.push((w, response));
            }
            if total == 0.0 {
                continue;
            }

            for &(w, response) in &scratch.responses {
                let mut err = response / total;
                if w == context {
                    err -= 1.0;
                }
                *scratch.errors.entry(w).or_insert(0.0) += err;
            }
        }

        // Backward: output rows first, then the target's input row.
        scratch.weighted_error.fill(0.0);
        let mut updated = 0;
        for (&w, &err) in &scratch.errors {
            if err == 0.0 {
                continue;
            }
            updated += 1;
            let mut out_row = self.output.row_mut(w);
            for (j, weight) in out_row.iter_mut().enumerate() {
                let grad = err * input[j];
                *weight -= self.output_grads.step(w, j, grad, self.learning_rate);
                scratch.weighted_error[j] += err * *weight;
            }
        }

        let mut in_row = self.input.row_mut(target);
        for (j, weight) in in_row.iter_mut().enumerate() {
            let grad = scratch.weighted_error[j];
            *weight -= self.input_grads.step(target, j, grad, self.learning_rate);
        }

        Ok(updated)
    }

    /// Consume the trainer, keeping only the input-side embeddings.
    pub fn into_embeddings(self) -> EmbeddingTable {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(negative_samples: usize) -> TrainingConfig {
        TrainingConfig {
            vector_size: 2,
            negative_samples,
            learning_rate: 0.1,
            ..TrainingConfig::default()
        }
    }

    fn instance(target: usize, context: &[usize]) -> TrainingInstance {
        TrainingInstance {
            target,
            context: context.iter().copied().collect(),
        }
    }

    fn trainer_with(negative_samples: usize, counts: Vec<u64>) -> Trainer {
        let input = EmbeddingTable::from_array(array![[0.5, 0.25], [0.1, 0.2], [0.3, 0.4]]);
        let output = EmbeddingTable::from_array(array![[0.2, 0.1], [0.6, 0.3], [0.4, 0.9]]);
        let dist = UnigramDistribution::from_counts(counts);
        Trainer::new(input, output, &dist, &config(negative_samples)).unwrap()
    }

    fn trainer(negative_samples: usize) -> Trainer {
        trainer_with(negative_samples, vec![1, 1, 1])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_single_update_by_hand() {
        // Word 0 is never drawn, so with context {1} the only negative is 2.
        let mut t = trainer_with(1, vec![0, 1, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let updated = t.train_instance(&instance(0, &[1]), &mut rng).unwrap();
        assert_eq!(updated, 2);

        let x = [0.5, 0.25];
        let s1 = sigmoid(0.6 * 0.5 + 0.3 * 0.25);
        let s2 = sigmoid(0.4 * 0.5 + 0.9 * 0.25);
        let err1 = s1 / (s1 + s2) - 1.0;
        let err2 = s2 / (s1 + s2);

        // The first adaptive step for a feature moves it by lr * sign(grad).
        let out1 = [0.6 - 0.1 * err1.signum(), 0.3 - 0.1 * err1.signum()];
        let out2 = [0.4 - 0.1 * err2.signum(), 0.9 - 0.1 * err2.signum()];
        for j in 0..2 {
            assert!(close(t.output().row(1)[j], out1[j]));
            assert!(close(t.output().row(2)[j], out2[j]));
        }
        assert_eq!(t.output().row(0).to_vec(), vec![0.2, 0.1]);

        for j in 0..2 {
            let weighted = err1 * out1[j] + err2 * out2[j];
            let expected = x[j] - 0.1 * weighted.signum();
            assert!(close(t.input().row(0)[j], expected));
        }
        // untouched input rows
        assert_eq!(t.input().row(1).to_vec(), vec![0.1, 0.2]);
        assert_eq!(t.input().row(2).to_vec(), vec![0.3, 0.4]);
    }

    #[test]
    fn test_empty_context_changes_nothing() {
        let mut t = trainer(1);
        let before = t.input().clone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let updated = t.train_instance(&instance(0, &[]), &mut rng).unwrap();
        assert_eq!(updated, 0);
        assert_eq!(t.input(), &before);
    }

    #[test]
    fn test_no_negatives_means_no_error() {
        // With only the true context word as candidate, prob = 1 and err = 0.
        let mut t = trainer(0);
        let before_in = t.input().clone();
        let before_out = t.output().clone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        t.train_instance(&instance(0, &[1, 2]), &mut rng).unwrap();
        assert_eq!(t.input(), &before_in);
        assert_eq!(t.output(), &before_out);
    }

    #[test]
    fn test_feasibility() {
        let t = trainer(1);
        assert!(t.check_feasible(&[instance(0, &[1])], 3).is_ok());
        let err = t
            .check_feasible(&[instance(0, &[0, 1, 2])], 3)
            .unwrap_err();
        assert!(matches!(
            err,
            Word2VecError::InsufficientVocabularyForNegativeSampling { vocab_size: 3, .. }
        ));
        // The error names the first failing set, not the widest one.
        let instances = [instance(0, &[1]), instance(2, &[0, 1]), instance(1, &[0, 1, 2])];
        let err = t.check_feasible(&instances, 2).unwrap_err();
        assert!(matches!(
            err,
            Word2VecError::InsufficientVocabularyForNegativeSampling {
                vocab_size: 3,
                context_size: 2,
                negative_samples: 1
            }
        ));
        assert!(trainer(0).check_feasible(&[instance(0, &[0, 1, 2])], 3).is_ok());
    }

    #[test]
    fn test_mismatched_tables_rejected() {
        let input = EmbeddingTable::from_array(Array2::zeros((2, 2)));
        let output = EmbeddingTable::from_array(Array2::zeros((3, 2)));
        let dist = UnigramDistribution::from_counts(vec![1, 1, 1]);
        assert!(Trainer::new(input, output, &dist, &config(1)).is_err());
    }

    #[test]
    fn test_epochs_report_stats() {
        let mut t = trainer(1);
        let mut instances = vec![instance(0, &[1]), instance(1, &[0]), instance(2, &[1])];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = vec![];
        t.train(&mut instances, 3, &mut rng, |stats| seen.push(stats.epoch))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(instances.len(), 3);
        assert!(t.input().as_array().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_gradient_reset_modes_differ() {
        let run = |reset: GradientReset| {
            let mut t = trainer(1);
            t.gradient_reset = reset;
            let mut instances = vec![instance(0, &[1]), instance(2, &[1])];
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            t.train(&mut instances, 2, &mut rng, |_| {}).unwrap();
            t.into_embeddings()
        };
        assert_ne!(run(GradientReset::PerEpoch), run(GradientReset::Never));
    }
}
