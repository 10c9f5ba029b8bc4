//! Weight tables and adaptive learning-rate state.

use ndarray::prelude::*;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// The logistic function, 1 / (1 + e^-x).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Amount to subtract from a parameter whose squared-gradient history
/// (including this step) is `accumulated`.
///
/// A zero gradient moves nothing; this also keeps a zero accumulator from
/// producing `0/0`.
pub fn adaptive_step(learning_rate: f64, accumulated: f64, grad: f64) -> f64 {
    if grad == 0.0 {
        0.0
    } else {
        learning_rate / accumulated.sqrt() * grad
    }
}

pub fn dot(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(a.len(), b.len());
    a.dot(&b)
}

pub fn norm(v: ArrayView1<'_, f64>) -> f64 {
    v.dot(&v).sqrt()
}

/// One row of `size` components per word.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    weights: Array2<f64>,
}

impl EmbeddingTable {
    /// Every component drawn independently from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(num_words: usize, size: usize, rng: &mut R) -> Self {
        EmbeddingTable {
            weights: Array2::random_using((num_words, size), Uniform::new(0.0, 1.0), rng),
        }
    }

    pub fn from_array(weights: Array2<f64>) -> Self {
        EmbeddingTable { weights }
    }

    pub fn num_words(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of components in each row.
    pub fn size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn row(&self, word: usize) -> ArrayView1<'_, f64> {
        self.weights.row(word)
    }

    pub fn row_mut(&mut self, word: usize) -> ArrayViewMut1<'_, f64> {
        self.weights.row_mut(word)
    }

    pub fn as_array(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn into_array(self) -> Array2<f64> {
        self.weights
    }
}

/// Running per-feature sums of squared gradients for every row of an
/// [`EmbeddingTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct GradientAccumulator {
    sums: Array2<f64>,
}

impl GradientAccumulator {
    pub fn new(num_words: usize, size: usize) -> Self {
        GradientAccumulator {
            sums: Array2::zeros((num_words, size)),
        }
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.sums.fill(0.0);
    }

    /// Record `grad` for `(word, feature)` and return the step to subtract
    /// from that parameter.
    pub fn step(&mut self, word: usize, feature: usize, grad: f64, learning_rate: f64) -> f64 {
        let sum = &mut self.sums[[word, feature]];
        *sum += grad * grad;
        adaptive_step(learning_rate, *sum, grad)
    }

    pub fn get(&self, word: usize, feature: usize) -> f64 {
        self.sums[[word, feature]]
    }
}
