//! Median / interquartile-range scaling

use crate::error::{ExoplanetError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty.
pub fn linear_quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Scaler centering each column on its median and dividing by its IQR
///
/// A column with zero IQR is only centered. The fitted parameters are
/// persisted with the model so serving applies the identical transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl RobustScaler {
    /// Fit per-column medians and interquartile ranges
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(ExoplanetError::insufficient(
                "scale_features",
                "cannot fit a scaler on zero rows",
            ));
        }

        let (center, scale): (Vec<f64>, Vec<f64>) =
            x.axis_iter(Axis(1)).map(Self::fit_column).unzip();
        Ok(Self { center, scale })
    }

    fn fit_column(column: ArrayView1<f64>) -> (f64, f64) {
        let mut sorted = column.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let median = Data::new(sorted.clone()).median();
        let iqr = linear_quantile(&sorted, 0.75) - linear_quantile(&sorted, 0.25);
        let scale = if iqr.abs() < f64::EPSILON || !iqr.is_finite() {
            1.0
        } else {
            iqr
        };
        (median, scale)
    }

    pub fn n_features(&self) -> usize {
        self.center.len()
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Scale a matrix with the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ExoplanetError::ShapeError {
                expected: format!("{} columns", self.n_features()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut out = x.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (center, scale) = (self.center[j], self.scale[j]);
            column.mapv_inplace(|v| (v - center) / scale);
        }
        Ok(out)
    }

    /// Scale one feature row
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(v, (center, scale))| (v - center) / scale)
            .collect())
    }

    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }
}
