//! Random forest classifier

use super::tree::DecisionTree;
use crate::error::{ExoplanetError, Result};
use crate::types::Label;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of Gini trees with sqrt-feature sampling per node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub random_state: u64,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            bootstrap: true,
            random_state: 42,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn max_features(n_features: usize) -> usize {
        ((n_features as f64).sqrt().floor() as usize).max(1)
    }

    /// Fit every tree in parallel, each on its own bootstrap sample
    pub fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(ExoplanetError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(ExoplanetError::Config(
                "n_estimators must be greater than 0".to_string(),
            ));
        }
        if n_samples == 0 {
            return Err(ExoplanetError::insufficient("fit", "cannot fit a forest on zero rows"));
        }

        self.n_features = x.ncols();
        let max_features = Self::max_features(self.n_features);

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Vec<Label> = sample_indices.iter().map(|&i| y[i]).collect();

                let mut tree = DecisionTree::new()
                    .with_max_depth(self.max_depth)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_random_state(rng.gen());
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.compute_feature_importances();
        log::debug!(
            "Random forest fitted: {} trees, {} features, {} max features per split",
            self.trees.len(),
            self.n_features,
            max_features
        );
        Ok(())
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, imp) in total.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for imp in &mut total {
                *imp /= sum;
            }
        }
        self.feature_importances = total;
    }

    /// Mean of the trees' leaf probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ExoplanetError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let per_tree = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<Vec<Array1<f64>>>>()?;

        let mut mean: Array1<f64> = Array1::zeros(x.nrows());
        for proba in &per_tree {
            mean += proba;
        }
        Ok(mean / self.trees.len() as f64)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| Label::from(p > 0.5))
            .collect())
    }

    /// Mean normalized impurity decrease, summing to 1 unless no split was made
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
