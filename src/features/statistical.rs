//! Dataset-level distribution statistics
//!
//! Skewness, excess kurtosis and coefficient of variation are computed once
//! per key column over the whole table ([`summarize_columns`]) and then
//! attached to every row as constant columns ([`broadcast_summary`]). They
//! describe the training set, not the individual candidate.

use crate::data::KoiTable;
use crate::error::Result;
use crate::types::{NON_FEATURE_COLUMNS, STAT_SUFFIXES};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// A mean must exceed this magnitude for a coefficient of variation
pub const CV_MEAN_THRESHOLD: f64 = 1e-10;

/// Population skewness (biased, Fisher-Pearson g1)
///
/// `None` for fewer than two values or zero variance.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let (m2, m3, _) = central_moments(values)?;
    Some(m3 / m2.powf(1.5))
}

/// Population excess kurtosis (biased, Fisher definition, normal = 0)
///
/// `None` for fewer than two values or zero variance.
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    let (m2, _, m4) = central_moments(values)?;
    Some(m4 / (m2 * m2) - 3.0)
}

/// Sample standard deviation over absolute mean.
///
/// `None` when the mean is within [`CV_MEAN_THRESHOLD`] of zero.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().mean();
    if mean.abs() <= CV_MEAN_THRESHOLD {
        return None;
    }
    let std_dev = values.iter().std_dev();
    if std_dev.is_finite() {
        Some(std_dev / mean.abs())
    } else {
        None
    }
}

/// Second, third and fourth central moments (divided by n)
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().mean();
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in values {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);

    // relative tolerance: constant columns leave only rounding noise in m2
    if m2 <= f64::EPSILON * mean.abs().max(1.0).powi(2) {
        return None;
    }
    Some((m2, m3, m4))
}

/// Distribution statistics of one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
}

impl ColumnSummary {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            skewness: skewness(values),
            kurtosis: kurtosis(values),
            coefficient_of_variation: coefficient_of_variation(values),
        }
    }
}

/// Per-column summaries in table order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    columns: Vec<(String, ColumnSummary)>,
}

impl DatasetSummary {
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, summary)| summary)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// (`<column>_skew|_kurt|_cv`, value) pairs; undefined statistics are left out
    pub fn statistic_columns(&self) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        for (name, summary) in &self.columns {
            let stats = [
                summary.skewness,
                summary.kurtosis,
                summary.coefficient_of_variation,
            ];
            for (suffix, value) in STAT_SUFFIXES.iter().zip(stats) {
                if let Some(value) = value {
                    out.push((format!("{}{}", name, suffix), value));
                }
            }
        }
        out
    }
}

/// True for columns whose name marks them as an already-derived statistic
pub fn is_statistic_column(name: &str) -> bool {
    STAT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Numeric columns matching a key pattern, excluding identifiers, labels
/// and statistic columns
pub fn key_columns<'a>(table: &'a KoiTable, patterns: &[String]) -> Vec<&'a str> {
    table
        .numeric_column_names()
        .into_iter()
        .filter(|name| !NON_FEATURE_COLUMNS.contains(name))
        .filter(|name| !is_statistic_column(name))
        .filter(|name| {
            let lower = name.to_lowercase();
            patterns.iter().any(|p| lower.contains(&p.to_lowercase()))
        })
        .collect()
}

/// Summarize every key column holding more than `min_samples` values
pub fn summarize_columns(table: &KoiTable, patterns: &[String], min_samples: usize) -> DatasetSummary {
    let mut columns = Vec::new();
    for name in key_columns(table, patterns) {
        let values: Vec<f64> = table
            .numeric(name)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| *v)
            .filter(|v| !v.is_nan())
            .collect();

        if values.len() <= min_samples {
            log::debug!(
                "Column '{}' has only {} values, no statistics",
                name,
                values.len()
            );
            continue;
        }
        columns.push((name.to_string(), ColumnSummary::from_values(&values)));
    }
    DatasetSummary { columns }
}

/// Copy of `table` with each summary statistic repeated on every row
pub fn broadcast_summary(table: &KoiTable, summary: &DatasetSummary) -> Result<KoiTable> {
    let mut out = table.clone();
    let n_rows = table.n_rows();
    for (name, value) in summary.statistic_columns() {
        out.set_numeric(&name, vec![Some(value); n_rows])?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use approx::assert_relative_eq;

    #[test]
    fn test_symmetric_skewness_is_zero() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(skewness(&values).unwrap(), 0.0, epsilon = 1e-12);
        // uniform-like: m4/m2^2 = 6.8/4 = 1.7
        assert_relative_eq!(kurtosis(&values).unwrap(), 1.7 - 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_right_skew_is_positive() {
        let values = [1.0, 1.0, 1.0, 1.0, 10.0];
        // m2 = 12.96, m3 = 69.984 -> 69.984 / 12.96^1.5 = 1.5
        assert_relative_eq!(skewness(&values).unwrap(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_coefficient_of_variation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = values.iter().std_dev() / 5.0;
        assert_relative_eq!(coefficient_of_variation(&values).unwrap(), expected);
        assert!(coefficient_of_variation(&[-1.0, 1.0, -2.0, 2.0]).is_none());
    }

    #[test]
    fn test_constant_column_has_no_moments() {
        let values = [3.0; 20];
        assert!(skewness(&values).is_none());
        assert!(kurtosis(&values).is_none());
        assert_relative_eq!(coefficient_of_variation(&values).unwrap(), 0.0);
    }

    #[test]
    fn test_key_column_selection() {
        let table = KoiTable::from_columns(vec![
            Column::text("kepid", vec![Some("1".into())]),
            Column::numeric("target_class", vec![Some(1.0)]),
            Column::numeric("koi_period", vec![Some(1.0)]),
            Column::numeric("koi_period_skew", vec![Some(0.1)]),
            Column::numeric("koi_steff", vec![Some(5000.0)]),
            Column::numeric("equilibrium_temp", vec![Some(300.0)]),
            Column::numeric("habitable_zone", vec![Some(0.0)]),
        ])
        .unwrap();

        let patterns: Vec<String> = ["period", "temp"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            key_columns(&table, &patterns),
            vec!["koi_period", "equilibrium_temp"]
        );
    }

    #[test]
    fn test_zero_mean_column_has_no_cv_column() {
        let centered: Vec<Option<f64>> = (0..20).map(|i| Some((i as f64) - 9.5)).collect();
        let table = KoiTable::from_columns(vec![Column::numeric("koi_impact", centered)]).unwrap();
        let patterns = vec!["impact".to_string()];

        let summary = summarize_columns(&table, &patterns, 10);
        let out = broadcast_summary(&table, &summary).unwrap();

        assert!(out.has_column("koi_impact_skew"));
        assert!(out.has_column("koi_impact_kurt"));
        assert!(!out.has_column("koi_impact_cv"));
    }

    #[test]
    fn test_broadcast_is_constant_and_min_samples_respected() {
        let values: Vec<Option<f64>> = (1..=11).map(|i| Some(i as f64)).collect();
        let short: Vec<Option<f64>> = (1..=11)
            .map(|i| if i <= 10 { Some(i as f64) } else { None })
            .collect();
        let table = KoiTable::from_columns(vec![
            Column::numeric("koi_depth", values),
            Column::numeric("koi_model_snr", short),
        ])
        .unwrap();
        let patterns = vec!["depth".to_string(), "snr".to_string()];

        let summary = summarize_columns(&table, &patterns, 10);
        assert!(summary.get("koi_depth").is_some());
        // exactly 10 values is not more than 10
        assert!(summary.get("koi_model_snr").is_none());

        let out = broadcast_summary(&table, &summary).unwrap();
        let cv = out.numeric("koi_depth_cv").unwrap();
        assert_eq!(cv.len(), 11);
        assert!(cv.iter().all(|v| *v == cv[0]));
    }
}
