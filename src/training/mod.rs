//! Ensemble training on the final temporal fold
//!
//! [`ModelTrainer`] consumes a [`PipelineOutput`], fits the soft-voting
//! ensemble on the last fold's training rows and evaluates it on that fold's
//! test rows. The result carries everything serving needs: manifest, scaler,
//! fitted ensemble, metrics and feature importances.

pub mod ensemble;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod tree;

pub use ensemble::{SoftVotingEnsemble, DECISION_THRESHOLD};
pub use forest::RandomForest;
pub use logistic::{balanced_sample_weights, LogisticRegression};
pub use metrics::{ClassificationMetrics, ConfusionMatrix, FeatureImportance};
pub use tree::{DecisionTree, TreeNode};

use crate::config::TrainingConfig;
use crate::error::{ExoplanetError, Result};
use crate::finalize::RobustScaler;
use crate::pipeline::PipelineOutput;
use crate::types::Label;
use chrono::{DateTime, Utc};
use ndarray::Axis;
use serde::{Deserialize, Serialize};

/// Everything needed to score a raw feature row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model_name: String,
    /// Input order expected by `scaler` and `ensemble`
    pub feature_names: Vec<String>,
    pub scaler: RobustScaler,
    pub ensemble: SoftVotingEnsemble,
    pub created_at: DateTime<Utc>,
}

impl ModelBundle {
    /// Scale a raw row and classify it
    pub fn predict_raw(&self, raw: &[f64]) -> Result<(Label, f64)> {
        let scaled = self.scaler.transform_row(raw)?;
        self.ensemble.predict_row(&scaled)
    }
}

/// Output of a training run
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub bundle: ModelBundle,
    pub metrics: ClassificationMetrics,
    pub importance: FeatureImportance,
}

/// Fits and evaluates the ensemble
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn train(&self, output: &PipelineOutput) -> Result<TrainedModel> {
        let fold = output.final_split().ok_or_else(|| {
            ExoplanetError::insufficient("train", "pipeline produced no temporal splits")
        })?;
        if fold.train.is_empty() || fold.test.is_empty() {
            return Err(ExoplanetError::insufficient(
                "train",
                "final fold has an empty train or test set",
            ));
        }
        if output.feature_names.len() != output.n_features() {
            return Err(ExoplanetError::ShapeError {
                expected: format!("{} feature names", output.n_features()),
                actual: format!("{} feature names", output.feature_names.len()),
            });
        }

        let x_train = output.matrix.select(Axis(0), &fold.train);
        let x_test = output.matrix.select(Axis(0), &fold.test);
        let y_train: Vec<Label> = fold.train.iter().map(|&i| output.labels[i]).collect();
        let y_test: Vec<Label> = fold.test.iter().map(|&i| output.labels[i]).collect();

        log::info!(
            "Training '{}' on final temporal fold: train={}, test={}",
            self.config.model_name,
            x_train.nrows(),
            x_test.nrows()
        );

        let mut ensemble = SoftVotingEnsemble::new(&self.config);
        ensemble.fit(&x_train, &y_train)?;

        let predicted = ensemble.predict(&x_test)?;
        let metrics =
            ClassificationMetrics::evaluate(&self.config.model_name, &y_test, &predicted, x_train.nrows());
        log::info!(
            "Training finished: accuracy={:.4}, f1={:.4}, precision={:.4}, recall={:.4}",
            metrics.accuracy,
            metrics.f1_score,
            metrics.precision,
            metrics.recall
        );

        let importance =
            FeatureImportance::from_scores(&output.feature_names, ensemble.feature_importances());

        let bundle = ModelBundle {
            model_name: self.config.model_name.clone(),
            feature_names: output.feature_names.clone(),
            scaler: output.scaler.clone(),
            ensemble,
            created_at: metrics.trained_at,
        };

        Ok(TrainedModel {
            bundle,
            metrics,
            importance,
        })
    }
}
