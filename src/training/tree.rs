//! Binary classification tree (Gini impurity)

use crate::error::{ExoplanetError, Result};
use crate::types::Label;
use ndarray::{Array1, Array2};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tree node; leaves hold the fraction of positive training rows.
///
/// Nodes live in a flat arena and children are referenced by index, which
/// keeps the serialized form shallow however deep the tree grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        probability: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
}

/// Gini impurity of a node with `positives` out of `total` rows
pub fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

/// Best split found on one node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at each node; `None` considers all of them
    pub max_features: Option<usize>,
    pub random_state: u64,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
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
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path, 0 for a single leaf
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(ExoplanetError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ExoplanetError::insufficient("fit", "cannot fit a tree on zero rows"));
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);

        let indices: Vec<usize> = (0..n_samples).collect();
        let mut nodes = Vec::new();
        self.build(x, y, &indices, 0, &mut importances, &mut rng, &mut nodes);
        self.nodes = nodes;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = importances;
        Ok(())
    }

    /// Grow the subtree for `indices` and return the index of its root node
    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        x: &Array2<f64>,
        y: &[Label],
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
        nodes: &mut Vec<TreeNode>,
    ) -> usize {
        let n_samples = indices.len();
        let positives = indices.iter().filter(|&&i| y[i] == 1).count();
        let node_idx = nodes.len();
        nodes.push(TreeNode::Leaf {
            probability: positives as f64 / n_samples.max(1) as f64,
            n_samples,
        });

        let pure = positives == 0 || positives == n_samples;
        if pure
            || n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
        {
            return node_idx;
        }

        let parent_impurity = gini(positives, n_samples);
        let Some(best) = self.find_best_split(x, y, indices, positives, parent_impurity, rng) else {
            return node_idx;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        importances[best.feature_idx] += n_samples as f64 * best.gain;

        let left = self.build(x, y, &left_idx, depth + 1, importances, rng, nodes);
        let right = self.build(x, y, &right_idx, depth + 1, importances, rng, nodes);
        nodes[node_idx] = TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
        };
        node_idx
    }

    /// Sweep sorted values of each candidate feature, tracking positives on
    /// the left. Features are visited in random order; after `max_features`
    /// of them the search stops as soon as a valid split exists.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &[Label],
        indices: &[usize],
        positives: usize,
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        if self.n_features == 0 {
            return None;
        }
        let k = self.max_features.unwrap_or(self.n_features).clamp(1, self.n_features);
        let order = sample(rng, self.n_features, self.n_features).into_vec();

        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, Label)> = Vec::with_capacity(n);

        for (visited, feature_idx) in order.into_iter().enumerate() {
            if visited >= k && best.is_some() {
                break;
            }

            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[[i, feature_idx]], y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0usize;
            for split in 1..n {
                left_pos += pairs[split - 1].1 as usize;
                let (prev, next) = (pairs[split - 1].0, pairs[split].0);
                if prev == next || split < self.min_samples_leaf || n - split < self.min_samples_leaf {
                    continue;
                }

                let (left_n, right_n) = (split, n - split);
                let weighted = (left_n as f64 * gini(left_pos, left_n)
                    + right_n as f64 * gini(positives - left_pos, right_n))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: (prev + next) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }

    /// Positive-class probability of one row
    pub fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        if self.nodes.is_empty() {
            return Err(ExoplanetError::ModelNotFitted);
        }
        if row.len() != self.n_features {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { probability, .. } => return Ok(*probability),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature_idx] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        x.rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(slice) => self.predict_proba_row(slice),
                None => self.predict_proba_row(&row.to_vec()),
            })
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from_vec)
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
