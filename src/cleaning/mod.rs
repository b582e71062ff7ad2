//! Data loading and cleaning
//!
//! `DataCleaner` loads the raw catalog, derives the binary label, removes
//! rows outside the NASA quality bounds, and imputes missing values.

pub mod filters;
pub mod imputation;

pub use filters::{FilterReport, ScientificFilter};
pub use imputation::{column_median, impute_table, ImputationReport};

use crate::config::PipelineConfig;
use crate::data::{Column, CsvFormat, CsvTableReader, KoiTable};
use crate::error::{ExoplanetError, Result};
use crate::types::{label_for_disposition, CRITICAL_COLUMNS, DISPOSITION, LABEL, NON_FEATURE_COLUMNS, TEXT_COLUMNS};
use hashbrown::HashMap;
use std::path::Path;

/// Loader and cleaner for KOI catalog rows
#[derive(Debug, Clone)]
pub struct DataCleaner {
    config: PipelineConfig,
}

impl DataCleaner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Load the source, keep the critical columns that exist, and replace the
    /// disposition with the binary `target_class` label.
    pub fn load_and_select(&self, source: &Path) -> Result<KoiTable> {
        log::info!("Loading catalog from {}", source.display());

        let format = CsvFormat {
            delimiter: self.config.delimiter as u8,
            comment: self.config.comment_prefix.map(|c| c as u8),
        };
        let raw = CsvTableReader::with_format(format).load(source, &CRITICAL_COLUMNS, &TEXT_COLUMNS)?;

        let dispositions = raw
            .text(DISPOSITION)
            .ok_or_else(|| ExoplanetError::MissingColumn(DISPOSITION.to_string()))?;
        let labels: Vec<Option<f64>> = dispositions
            .iter()
            .map(|d| d.as_deref().map(|s| label_for_disposition(s) as f64))
            .collect();

        let mut table = raw.without_columns(&[DISPOSITION]);
        table.set_column(Column::numeric(LABEL, labels))?;

        let distribution = label_distribution(&table);
        log::info!(
            "Target distribution: label 1 = {}, label 0 = {}, missing = {}",
            distribution.get(&Some(1)).copied().unwrap_or(0),
            distribution.get(&Some(0)).copied().unwrap_or(0),
            distribution.get(&None).copied().unwrap_or(0),
        );
        log::info!(
            "Catalog loaded. Initial rows: {}. Columns: {:?}",
            table.n_rows(),
            table.column_names()
        );
        Ok(table)
    }

    /// Remove unlabelled rows and rows outside the domain bounds
    pub fn apply_scientific_filters(&self, table: &KoiTable) -> Result<KoiTable> {
        self.apply_scientific_filters_with_report(table)
            .map(|(cleaned, _)| cleaned)
    }

    /// As [`DataCleaner::apply_scientific_filters`], also returning per-filter counts
    pub fn apply_scientific_filters_with_report(
        &self,
        table: &KoiTable,
    ) -> Result<(KoiTable, FilterReport)> {
        log::info!("Applying astronomical quality filters");
        let filter = ScientificFilter::new(self.config.domain_bounds.clone());
        let (cleaned, report) = filter.apply(table)?;

        if cleaned.is_empty() {
            return Err(ExoplanetError::insufficient(
                "apply_scientific_filters",
                format!("all {} rows were removed by the quality filters", report.rows_in),
            ));
        }
        Ok((cleaned, report))
    }

    /// Median-impute numeric columns, then drop rows that are still incomplete
    pub fn handle_missing_values(&self, table: &KoiTable) -> Result<KoiTable> {
        log::info!("Imputing missing values with column medians");
        let (complete, report) = impute_table(table, &NON_FEATURE_COLUMNS)?;

        log::info!("Imputed columns: {:?}", report.imputed_columns);
        if report.residual_rows_dropped > 0 {
            let ratio = report.residual_rows_dropped as f64 / table.n_rows().max(1) as f64;
            if ratio > self.config.residual_drop_warn_ratio {
                log::warn!(
                    "Dropped {} rows ({:.1}%) still incomplete after imputation",
                    report.residual_rows_dropped,
                    ratio * 100.0
                );
            } else {
                log::info!(
                    "Dropped {} rows still incomplete after imputation",
                    report.residual_rows_dropped
                );
            }
        }

        if complete.is_empty() {
            return Err(ExoplanetError::insufficient(
                "handle_missing_values",
                format!("no complete rows remain out of {}", table.n_rows()),
            ));
        }
        log::info!("Missing-value handling done. Final rows: {}", complete.n_rows());
        Ok(complete)
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Row counts per label value (`None` = missing label)
pub fn label_distribution(table: &KoiTable) -> HashMap<Option<u8>, usize> {
    let mut counts = HashMap::new();
    if let Some(labels) = table.numeric(LABEL) {
        for label in labels {
            *counts.entry(label.map(|l| l as u8)).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KEPID, PERIOD, SNR};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_derives_label() {
        let file = write_csv(
            "kepid,koi_disposition,koi_period,koi_model_snr,koi_teq\n\
             1,CONFIRMED,10.0,20.0,300\n\
             2,CANDIDATE,11.0,25.0,310\n\
             3,FALSE POSITIVE,12.0,30.0,320\n\
             4,,13.0,35.0,330\n",
        );

        let cleaner = DataCleaner::default();
        let table = cleaner.load_and_select(file.path()).unwrap();

        assert_eq!(table.column_names(), vec![KEPID, PERIOD, SNR, LABEL]);
        assert_eq!(
            table.numeric(LABEL).unwrap(),
            &[Some(1.0), Some(1.0), Some(0.0), None]
        );
        assert!(!table.has_column(DISPOSITION));
    }

    #[test]
    fn test_load_without_disposition_fails() {
        let file = write_csv("kepid,koi_period\n1,10.0\n");
        let cleaner = DataCleaner::default();
        assert!(matches!(
            cleaner.load_and_select(file.path()),
            Err(ExoplanetError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_filters_removing_everything_is_fatal() {
        let table = KoiTable::from_columns(vec![
            Column::numeric(LABEL, vec![Some(1.0), Some(0.0)]),
            Column::numeric(PERIOD, vec![Some(5000.0), Some(0.01)]),
        ])
        .unwrap();

        let cleaner = DataCleaner::default();
        let err = cleaner.apply_scientific_filters(&table).unwrap_err();
        assert!(matches!(err, ExoplanetError::InsufficientData { .. }));
    }

    #[test]
    fn test_handle_missing_values_keeps_label_untouched() {
        let table = KoiTable::from_columns(vec![
            Column::numeric(LABEL, vec![Some(1.0), Some(0.0), Some(1.0)]),
            Column::numeric(PERIOD, vec![Some(1.0), None, Some(5.0)]),
        ])
        .unwrap();

        let cleaner = DataCleaner::default();
        let filled = cleaner.handle_missing_values(&table).unwrap();
        assert_eq!(filled.n_rows(), 3);
        assert_eq!(
            filled.numeric(PERIOD).unwrap(),
            &[Some(1.0), Some(3.0), Some(5.0)]
        );
        assert_eq!(filled.numeric(LABEL).unwrap(), table.numeric(LABEL).unwrap());
    }
}
