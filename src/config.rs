//! Hyperparameters for a training run.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, Word2VecError};

/// When the adaptive learning-rate accumulators are cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientReset {
    /// Clear both accumulators at the start of every epoch.
    #[default]
    PerEpoch,
    /// Accumulate over the whole run (plain AdaGrad).
    Never,
}

/// Configuration for one call to [`generate_word_vectors`](crate::generate_word_vectors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of components in each embedding vector.
    /// Default: 300.
    pub vector_size: usize,

    /// Radius of the context window around each target word.
    /// Default: 5.
    pub context_size: usize,

    /// Negative samples drawn per training instance.
    /// Default: 10.
    pub negative_samples: usize,

    /// Base learning rate, scaled per feature by the accumulated gradients.
    /// Default: 0.01.
    pub learning_rate: f64,

    /// Number of passes over the shuffled training instances.
    /// Default: 5.
    pub num_epochs: usize,

    /// Random seed for reproducibility.
    /// Default: None (seeded from the OS).
    pub seed: Option<u64>,

    /// Rejection-sampling budget: at most `negative_samples * max_draws_per_sample`
    /// draws are made for one instance.
    /// Default: 1000.
    pub max_draws_per_sample: usize,

    /// Default: [`GradientReset::PerEpoch`].
    pub gradient_reset: GradientReset,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vector_size: 300,
            context_size: 5,
            negative_samples: 10,
            learning_rate: 0.01,
            num_epochs: 5,
            seed: None,
            max_draws_per_sample: 1000,
            gradient_reset: GradientReset::PerEpoch,
        }
    }
}

impl TrainingConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Check that every hyperparameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.vector_size == 0 {
            return Err(Word2VecError::InvalidConfiguration(
                "vector_size must be positive".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Word2VecError::InvalidConfiguration(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.max_draws_per_sample == 0 {
            return Err(Word2VecError::InvalidConfiguration(
                "max_draws_per_sample must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on the draws made while collecting one instance's negatives.
    pub fn max_negative_draws(&self) -> usize {
        self.negative_samples
            .saturating_mul(self.max_draws_per_sample)
    }
}
