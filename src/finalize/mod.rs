//! Class balancing, robust scaling and temporal splitting

pub mod balance;
pub mod scaler;
pub mod splits;

pub use balance::{balance_classes, balanced_order, class_indices};
pub use scaler::{linear_quantile, RobustScaler};
pub use splits::{create_temporal_splits, TemporalFold};

use crate::config::PipelineConfig;
use crate::data::{ColumnData, KoiTable};
use crate::error::{ExoplanetError, Result};
use crate::types::Label;
use ndarray::Array2;

/// Last preprocessing stage: turns the engineered feature table into a
/// balanced, scaled matrix with walk-forward folds
#[derive(Debug, Clone)]
pub struct DataFinalizer {
    random_seed: u64,
    fold_count: usize,
}

impl DataFinalizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            random_seed: config.random_seed,
            fold_count: config.fold_count,
        }
    }

    pub fn balance_classes(&self, features: &KoiTable, labels: &[Label]) -> Result<(KoiTable, Vec<Label>)> {
        log::info!("Balancing classes by oversampling the minority label");
        balance_classes(features, labels, self.random_seed)
    }

    /// Fit a [`RobustScaler`] on every row and return it with the scaled matrix
    pub fn scale_features(&self, features: &KoiTable) -> Result<(Array2<f64>, RobustScaler)> {
        log::info!("Scaling {} features with median and IQR", features.n_cols());
        let matrix = table_to_matrix(features)?;
        let (scaler, scaled) = RobustScaler::fit_transform(&matrix)?;
        Ok((scaled, scaler))
    }

    pub fn create_temporal_splits(&self, matrix: &Array2<f64>, labels: &[Label]) -> Result<Vec<TemporalFold>> {
        if matrix.nrows() != labels.len() {
            return Err(ExoplanetError::ShapeError {
                expected: format!("{} labels", matrix.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }

        log::info!("Creating {} temporal splits", self.fold_count);
        let folds = create_temporal_splits(matrix.nrows(), self.fold_count)?;
        for (i, fold) in folds.iter().enumerate() {
            log::info!(
                "  Split {}: train={} ({:.1}%), test={}",
                i + 1,
                fold.train_len(),
                fold.train_ratio(matrix.nrows()) * 100.0,
                fold.test_len()
            );
        }
        Ok(folds)
    }
}

impl Default for DataFinalizer {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

/// Row-major matrix of an all-numeric, fully populated table
pub fn table_to_matrix(table: &KoiTable) -> Result<Array2<f64>> {
    let (n_rows, n_cols) = (table.n_rows(), table.n_cols());
    let mut matrix = Array2::zeros((n_rows, n_cols));

    for (j, column) in table.columns().iter().enumerate() {
        let values = match &column.data {
            ColumnData::Numeric(values) => values,
            ColumnData::Text(_) => {
                return Err(ExoplanetError::Validation(format!(
                    "feature column '{}' is not numeric",
                    column.name
                )))
            }
        };
        for (i, value) in values.iter().enumerate() {
            match value {
                Some(v) if !v.is_nan() => matrix[[i, j]] = *v,
                _ => {
                    return Err(ExoplanetError::Validation(format!(
                        "feature column '{}' has a missing value at row {}",
                        column.name, i
                    )))
                }
            }
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    #[test]
    fn test_table_to_matrix() {
        let table = KoiTable::from_columns(vec![
            Column::numeric("a", vec![Some(1.0), Some(2.0)]),
            Column::numeric("b", vec![Some(3.0), Some(4.0)]),
        ])
        .unwrap();
        let matrix = table_to_matrix(&table).unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[1, 0]], 2.0);
        assert_eq!(matrix[[0, 1]], 3.0);
    }

    #[test]
    fn test_table_to_matrix_rejects_text_and_gaps() {
        let text = KoiTable::from_columns(vec![Column::text("kepid", vec![Some("1".into())])]).unwrap();
        assert!(table_to_matrix(&text).is_err());

        let gap = KoiTable::from_columns(vec![Column::numeric("a", vec![Some(1.0), None])]).unwrap();
        assert!(table_to_matrix(&gap).is_err());
    }

    #[test]
    fn test_splits_check_label_length() {
        let finalizer = DataFinalizer::default();
        let matrix = Array2::zeros((12, 2));
        assert!(finalizer.create_temporal_splits(&matrix, &[0; 11]).is_err());
        assert_eq!(finalizer.create_temporal_splits(&matrix, &[0; 12]).unwrap().len(), 5);
    }
}
