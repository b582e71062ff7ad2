//! Holdout metrics and feature importances

use crate::types::Label;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Binary confusion counts, positive class = 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[Label], predicted: &[Label]) -> Self {
        let mut matrix = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a == 1, p == 1) {
                (true, true) => matrix.true_positives += 1,
                (false, true) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// 0 when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// 0 when there are no actual positives
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1_score(&self) -> f64 {
        let (precision, recall) = (self.precision(), self.recall());
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Metrics of one training run, evaluated on the final temporal fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub model_name: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub confusion: ConfusionMatrix,
    pub run_id: Uuid,
    pub trained_at: DateTime<Utc>,
}

impl ClassificationMetrics {
    pub fn evaluate(
        model_name: &str,
        actual: &[Label],
        predicted: &[Label],
        train_size: usize,
    ) -> Self {
        let confusion = ConfusionMatrix::from_predictions(actual, predicted);
        Self {
            model_name: model_name.to_string(),
            accuracy: confusion.accuracy(),
            precision: confusion.precision(),
            recall: confusion.recall(),
            f1_score: confusion.f1_score(),
            train_size,
            test_size: actual.len(),
            confusion,
            run_id: Uuid::new_v4(),
            trained_at: Utc::now(),
        }
    }
}

/// Feature name → relative importance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureImportance {
    scores: BTreeMap<String, f64>,
}

impl FeatureImportance {
    /// Pair names with scores; negative or non-finite scores become 0
    pub fn from_scores(names: &[String], scores: &[f64]) -> Self {
        let scores = names
            .iter()
            .zip(scores)
            .map(|(name, &score)| {
                let score = if score.is_finite() { score.max(0.0) } else { 0.0 };
                (name.clone(), score)
            })
            .collect();
        Self { scores }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.scores.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All entries by descending score, ties broken by name
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .scores
            .iter()
            .map(|(name, score)| (name.as_str(), *score))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn top_n(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}
