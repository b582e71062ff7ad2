//! Domain-validity filters for catalog rows
//!
//! Rows without ground truth go first, then each bound is applied in order.
//! A row failing any bound is removed.

use crate::config::DomainBound;
use crate::data::KoiTable;
use crate::error::{ExoplanetError, Result};
use crate::types::LABEL;
use serde::{Deserialize, Serialize};

/// Rows removed by each filter step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    pub rows_in: usize,
    pub missing_label_removed: usize,
    /// (column, rows removed) in application order; skipped columns are absent
    pub removed_per_filter: Vec<(String, usize)>,
    pub rows_out: usize,
}

impl FilterReport {
    /// Reduction caused by the domain bounds, relative to the labelled rows
    pub fn reduction_pct(&self) -> f64 {
        let labelled = self.rows_in - self.missing_label_removed;
        if labelled == 0 {
            return 0.0;
        }
        (1.0 - self.rows_out as f64 / labelled as f64) * 100.0
    }
}

/// Applies the configured (column, min, max) bounds
#[derive(Debug, Clone)]
pub struct ScientificFilter {
    bounds: Vec<DomainBound>,
}

impl ScientificFilter {
    pub fn new(bounds: Vec<DomainBound>) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &[DomainBound] {
        &self.bounds
    }

    /// Drop unlabelled rows, then rows violating any bound
    pub fn apply(&self, table: &KoiTable) -> Result<(KoiTable, FilterReport)> {
        let rows_in = table.n_rows();

        let labels = table
            .numeric(LABEL)
            .ok_or_else(|| ExoplanetError::MissingColumn(LABEL.to_string()))?;
        let has_label: Vec<bool> = labels.iter().map(|l| l.is_some()).collect();
        let mut current = table.filter_rows(&has_label)?;
        let missing_label_removed = rows_in - current.n_rows();
        log::info!("   Rows without label removed: {}", missing_label_removed);

        let mut removed_per_filter = Vec::with_capacity(self.bounds.len());
        for bound in &self.bounds {
            let values = match current.numeric(&bound.column) {
                Some(values) => values,
                None => {
                    log::warn!(
                        "   Column '{}' not present, skipping filter ({})",
                        bound.column,
                        bound.description
                    );
                    continue;
                }
            };

            let keep: Vec<bool> = values.iter().map(|&v| bound.contains(v)).collect();
            let before = current.n_rows();
            current = current.filter_rows(&keep)?;
            let removed = before - current.n_rows();

            log::info!(
                "   {} [{}, {}] on {}: -{} rows",
                bound.description,
                bound.min,
                bound.max,
                bound.column,
                removed
            );
            removed_per_filter.push((bound.column.clone(), removed));
        }

        let report = FilterReport {
            rows_in,
            missing_label_removed,
            removed_per_filter,
            rows_out: current.n_rows(),
        };
        log::info!(
            "   Total reduction: {:.1}% ({} rows remaining)",
            report.reduction_pct(),
            report.rows_out
        );

        Ok((current, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_domain_bounds;
    use crate::data::Column;
    use crate::types::{DEPTH, DURATION, PERIOD, SNR};

    fn table(rows: &[(Option<f64>, f64, f64, f64, Option<f64>)]) -> KoiTable {
        KoiTable::from_columns(vec![
            Column::numeric(LABEL, rows.iter().map(|r| r.0).collect()),
            Column::numeric(PERIOD, rows.iter().map(|r| Some(r.1)).collect()),
            Column::numeric(DURATION, rows.iter().map(|r| Some(r.2)).collect()),
            Column::numeric(DEPTH, rows.iter().map(|r| Some(r.3)).collect()),
            Column::numeric(SNR, rows.iter().map(|r| r.4).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_filters_remove_out_of_bounds() {
        let input = table(&[
            (Some(1.0), 10.0, 3.0, 500.0, Some(20.0)),  // keep
            (None, 10.0, 3.0, 500.0, Some(20.0)),       // no label
            (Some(0.0), 0.1, 3.0, 500.0, Some(20.0)),   // period too short
            (Some(0.0), 10.0, 60.0, 500.0, Some(20.0)), // duration too long
            (Some(1.0), 10.0, 3.0, 5.0, Some(20.0)),    // depth too shallow
            (Some(1.0), 10.0, 3.0, 500.0, Some(7.0)),   // below SNR threshold
            (Some(0.0), 10.0, 3.0, 500.0, None),        // SNR missing
            (Some(0.0), 1000.0, 48.0, 100_000.0, Some(7.1)), // boundaries keep
        ]);

        let filter = ScientificFilter::new(default_domain_bounds());
        let (cleaned, report) = filter.apply(&input).unwrap();

        assert_eq!(cleaned.n_rows(), 2);
        assert_eq!(report.rows_in, 8);
        assert_eq!(report.missing_label_removed, 1);
        assert_eq!(
            report.removed_per_filter,
            vec![
                (PERIOD.to_string(), 1),
                (DURATION.to_string(), 1),
                (DEPTH.to_string(), 1),
                (SNR.to_string(), 2),
            ]
        );
        assert!((report.reduction_pct() - (1.0 - 2.0 / 7.0) * 100.0).abs() < 1e-9);
        // input untouched
        assert_eq!(input.n_rows(), 8);
    }

    #[test]
    fn test_absent_bound_column_is_skipped() {
        let input = KoiTable::from_columns(vec![
            Column::numeric(LABEL, vec![Some(1.0), Some(0.0)]),
            Column::numeric(PERIOD, vec![Some(10.0), Some(2000.0)]),
        ])
        .unwrap();

        let filter = ScientificFilter::new(default_domain_bounds());
        let (cleaned, report) = filter.apply(&input).unwrap();
        assert_eq!(cleaned.n_rows(), 1);
        assert_eq!(report.removed_per_filter.len(), 1);
    }

    #[test]
    fn test_missing_label_column_is_error() {
        let input =
            KoiTable::from_columns(vec![Column::numeric(PERIOD, vec![Some(10.0)])]).unwrap();
        let filter = ScientificFilter::new(default_domain_bounds());
        assert!(matches!(
            filter.apply(&input),
            Err(ExoplanetError::MissingColumn(_))
        ));
    }
}
