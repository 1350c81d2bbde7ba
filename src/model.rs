// Random forest over linfa decision trees, plus the held-out accuracy metric.
use std::collections::HashSet;

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::PipelineError;

/// Feature-subset size used when growing each tree.
#[derive(Debug, Clone, Copy)]
pub enum MaxFeatures {
    /// ceil(sqrt(p)), the usual classification default.
    Sqrt,
    /// ceil(log2(p))
    Log2,
    /// All p features; plain bagging.
    All,
}

impl MaxFeatures {
    fn subset_size(self, n_features: usize) -> usize {
        let m = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::All => n_features,
        };
        m.clamp(1, n_features)
    }
}

/// Forest hyperparameters. The defaults mirror a reasonable standard: 20 trees,
/// library-default depth, sqrt feature subsets, unseeded.
#[derive(Debug, Clone, Copy)]
pub struct RandomForestParams {
    n_estimators: usize,
    max_depth: Option<usize>,
    max_features: MaxFeatures,
    seed: Option<u64>,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        RandomForestParams {
            n_estimators: 20,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            seed: None,
        }
    }
}

impl RandomForestParams {
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// A fitted ensemble: each tree carries the sorted feature subset it was grown
/// on, so prediction can project the matching columns back out.
#[derive(Debug)]
pub struct RandomForest {
    trees: Vec<(DecisionTree<f64, usize>, Vec<usize>)>,
    n_classes: usize,
}

impl RandomForest {
    /// Fit the ensemble on the training partition.
    ///
    /// Each tree sees a bootstrap resample of the rows (with replacement, same
    /// size as the input) and a random feature subset sampled without
    /// replacement, with splits chosen by Gini impurity. An empty or
    /// single-class training partition is rejected up front rather than
    /// producing a degenerate constant model.
    pub fn fit(
        params: &RandomForestParams,
        x: &Array2<f64>,
        y: &Array1<usize>,
    ) -> Result<Self, PipelineError> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(PipelineError::EmptyTrainingPartition);
        }
        let classes: HashSet<usize> = y.iter().copied().collect();
        if classes.len() < 2 {
            return Err(PipelineError::SingleClassTraining);
        }
        let n_classes = y.iter().copied().max().unwrap_or(0) + 1;

        let mut rng = match params.seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        let subset_size = params.max_features.subset_size(x.ncols());

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let mut feats = rand::seq::index::sample(&mut rng, x.ncols(), subset_size).into_vec();
            feats.sort_unstable();

            let xs = x.select(Axis(0), &rows).select(Axis(1), &feats);
            let ys = y.select(Axis(0), &rows);
            let tree = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(params.max_depth)
                .fit(&Dataset::new(xs, ys))?;
            trees.push((tree, feats));
        }

        Ok(RandomForest { trees, n_classes })
    }

    /// Predict the class of every row by majority vote across the trees, with
    /// ties going to the smaller class index.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        let mut votes = Array2::<usize>::zeros((x.nrows(), self.n_classes));
        for (tree, feats) in &self.trees {
            let sub = x.select(Axis(1), feats);
            let pred = tree.predict(&sub);
            for (row, class) in pred.iter().enumerate() {
                votes[(row, *class)] += 1;
            }
        }

        Array1::from_iter(votes.rows().into_iter().map(|row| {
            let mut best = 0;
            for (class, count) in row.iter().enumerate() {
                if *count > row[best] {
                    best = class;
                }
            }
            best
        }))
    }
}

/// Fraction of rows where the prediction matches the truth.
///
/// An empty test partition is a reported error, never a silent NaN, and a
/// length mismatch between the two sequences is rejected outright.
pub fn accuracy(predicted: &Array1<usize>, actual: &Array1<usize>) -> Result<f64, PipelineError> {
    if predicted.len() != actual.len() {
        return Err(PipelineError::LengthMismatch {
            predicted: predicted.len(),
            actual: actual.len(),
        });
    }
    if actual.is_empty() {
        return Err(PipelineError::EmptyTestPartition);
    }
    let matched = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    Ok(matched as f64 / actual.len() as f64)
}
