//! Feature engineering: physics-derived columns and dataset-level statistics

pub mod astronomical;
pub mod statistical;

pub use astronomical::create_astronomical_features;
pub use statistical::{
    broadcast_summary, summarize_columns, ColumnSummary, DatasetSummary,
};

use crate::config::PipelineConfig;
use crate::data::KoiTable;
use crate::error::Result;

/// Adds engineered columns to a cleaned table
#[derive(Debug, Clone)]
pub struct FeatureCreator {
    key_patterns: Vec<String>,
    min_stat_samples: usize,
}

impl FeatureCreator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            key_patterns: config.key_patterns.clone(),
            min_stat_samples: config.min_stat_samples,
        }
    }

    /// Orbital distance, planet radius, luminosity, equilibrium temperature,
    /// habitable-zone flag and SNR features
    pub fn create_astronomical_features(&self, table: &KoiTable) -> Result<KoiTable> {
        log::info!("Creating physics-based features");
        create_astronomical_features(table)
    }

    /// Skewness, kurtosis and coefficient of variation of each key column,
    /// broadcast to every row
    pub fn create_statistical_features(&self, table: &KoiTable) -> Result<KoiTable> {
        log::info!("Creating dataset-level statistical features");
        let summary = self.summarize(table);
        let out = broadcast_summary(table, &summary)?;
        log::info!(
            "Statistical features added for {} columns. Total columns: {}",
            summary.len(),
            out.n_cols()
        );
        Ok(out)
    }

    /// Summary step of [`FeatureCreator::create_statistical_features`]
    pub fn summarize(&self, table: &KoiTable) -> DatasetSummary {
        summarize_columns(table, &self.key_patterns, self.min_stat_samples)
    }
}

impl Default for FeatureCreator {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::types::{LABEL, LOG_SNR, SNR};

    #[test]
    fn test_statistics_cover_derived_columns() {
        let snr: Vec<Option<f64>> = (0..30).map(|i| Some(8.0 + i as f64 * 1.7)).collect();
        let labels: Vec<Option<f64>> = (0..30).map(|i| Some((i % 2) as f64)).collect();
        let table = KoiTable::from_columns(vec![
            Column::numeric(LABEL, labels),
            Column::numeric(SNR, snr),
        ])
        .unwrap();

        let creator = FeatureCreator::default();
        let physics = creator.create_astronomical_features(&table).unwrap();
        let stats = creator.create_statistical_features(&physics).unwrap();

        for name in [
            "koi_model_snr_skew",
            "koi_model_snr_kurt",
            "koi_model_snr_cv",
            "log_snr_skew",
            "snr_high_quality_skew",
        ] {
            assert!(stats.has_column(name), "missing {}", name);
        }
        assert!(physics.has_column(LOG_SNR));
        assert!(!stats.has_column("target_class_skew"));
    }
}
