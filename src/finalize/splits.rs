//! Forward-chaining temporal cross-validation folds

use crate::error::{ExoplanetError, Result};
use serde::{Deserialize, Serialize};

/// One train/test pair over row positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalFold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl TemporalFold {
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    pub fn test_len(&self) -> usize {
        self.test.len()
    }

    /// Fraction of `n_samples` used for training
    pub fn train_ratio(&self, n_samples: usize) -> f64 {
        if n_samples == 0 {
            0.0
        } else {
            self.train.len() as f64 / n_samples as f64
        }
    }
}

/// Walk-forward folds over `n_samples` ordered rows.
///
/// Every test block has `n_samples / (fold_count + 1)` rows; the blocks are
/// laid back to back ending at the last row, and each fold trains on every
/// row before its test block. Leftover rows from the integer division go to
/// the first training set.
pub fn create_temporal_splits(n_samples: usize, fold_count: usize) -> Result<Vec<TemporalFold>> {
    if fold_count < 2 {
        return Err(ExoplanetError::Config(format!(
            "fold_count must be at least 2, got {}",
            fold_count
        )));
    }
    if n_samples < fold_count + 1 {
        return Err(ExoplanetError::insufficient(
            "create_temporal_splits",
            format!(
                "{} folds need at least {} rows, got {}",
                fold_count,
                fold_count + 1,
                n_samples
            ),
        ));
    }

    let test_size = n_samples / (fold_count + 1);
    let first_test_start = n_samples - fold_count * test_size;

    let folds = (0..fold_count)
        .map(|i| {
            let start = first_test_start + i * test_size;
            TemporalFold {
                train: (0..start).collect(),
                test: (start..start + test_size).collect(),
            }
        })
        .collect();
    Ok(folds)
}
