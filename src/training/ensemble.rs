//! Soft-voting ensemble of a random forest and a logistic regression

use super::forest::RandomForest;
use super::logistic::LogisticRegression;
use crate::config::TrainingConfig;
use crate::error::{ExoplanetError, Result};
use crate::types::Label;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Positive class is predicted when the averaged probability exceeds this
pub const DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftVotingEnsemble {
    forest: RandomForest,
    logistic: LogisticRegression,
}

impl SoftVotingEnsemble {
    pub fn new(config: &TrainingConfig) -> Self {
        let forest = RandomForest::new(config.n_estimators)
            .with_max_depth(config.max_depth)
            .with_min_samples_leaf(config.min_samples_leaf)
            .with_random_state(config.random_seed);
        Self {
            forest,
            logistic: LogisticRegression::from_config(config),
        }
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn logistic(&self) -> &LogisticRegression {
        &self.logistic
    }

    pub fn n_features(&self) -> usize {
        self.forest.n_features()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()> {
        log::info!("Fitting random forest ({} trees)", self.forest.n_estimators);
        self.forest.fit(x, y)?;
        log::info!("Fitting logistic regression");
        self.logistic.fit(x, y)?;
        Ok(())
    }

    /// Mean of the two members' positive-class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let forest = self.forest.predict_proba(x)?;
        let logistic = self.logistic.predict_proba(x)?;
        Ok((forest + logistic) / 2.0)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| Label::from(p > DECISION_THRESHOLD))
            .collect())
    }

    /// Label and positive-class probability of a single row
    pub fn predict_row(&self, row: &[f64]) -> Result<(Label, f64)> {
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec()).map_err(|e| {
            ExoplanetError::ShapeError {
                expected: format!("1 x {} row", row.len()),
                actual: e.to_string(),
            }
        })?;
        let confidence = self.predict_proba(&x)?[0];
        Ok((Label::from(confidence > DECISION_THRESHOLD), confidence))
    }

    pub fn feature_importances(&self) -> &[f64] {
        self.forest.feature_importances()
    }
}
