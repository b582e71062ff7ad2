//! Preprocessing pipeline orchestrator
//!
//! Runs the stages in a fixed order:
//!
//! load → filter → impute → astronomical features → statistical features →
//! feature selection → balance → scale → split
//!
//! The feature-name manifest is captured after balancing and before scaling,
//! so its order matches the matrix columns exactly. A failing stage is
//! reported as [`ExoplanetError::Stage`] wrapping the original error; nothing
//! is retried.

use crate::cleaning::{label_distribution, DataCleaner, FilterReport};
use crate::config::PipelineConfig;
use crate::data::KoiTable;
use crate::error::{ExoplanetError, Result};
use crate::features::FeatureCreator;
use crate::finalize::{class_indices, DataFinalizer, RobustScaler, TemporalFold};
use crate::types::{Label, LABEL, NON_FEATURE_COLUMNS};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Load,
    Filter,
    Impute,
    AstronomicalFeatures,
    StatisticalFeatures,
    SelectFeatures,
    Balance,
    Scale,
    Split,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 9] = [
        PipelineStage::Load,
        PipelineStage::Filter,
        PipelineStage::Impute,
        PipelineStage::AstronomicalFeatures,
        PipelineStage::StatisticalFeatures,
        PipelineStage::SelectFeatures,
        PipelineStage::Balance,
        PipelineStage::Scale,
        PipelineStage::Split,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Load => "load_and_select",
            PipelineStage::Filter => "apply_scientific_filters",
            PipelineStage::Impute => "handle_missing_values",
            PipelineStage::AstronomicalFeatures => "create_astronomical_features",
            PipelineStage::StatisticalFeatures => "create_statistical_features",
            PipelineStage::SelectFeatures => "select_features",
            PipelineStage::Balance => "balance_classes",
            PipelineStage::Scale => "scale_features",
            PipelineStage::Split => "create_temporal_splits",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Row and column counts around one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub stages: Vec<StageRecord>,
    pub filter: Option<FilterReport>,
    /// (label, rows) after balancing, ascending by label
    pub class_counts: Vec<(Label, usize)>,
    pub feature_count: usize,
    pub fold_count: usize,
}

impl PipelineReport {
    fn record(&mut self, stage: PipelineStage, rows_in: usize, rows_out: usize, columns_out: usize) {
        log::debug!("{}: {} -> {} rows, {} columns", stage, rows_in, rows_out, columns_out);
        self.stages.push(StageRecord {
            stage,
            rows_in,
            rows_out,
            columns_out,
        });
    }

    pub fn stage(&self, stage: PipelineStage) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn rows_loaded(&self) -> usize {
        self.stage(PipelineStage::Load).map_or(0, |r| r.rows_out)
    }

    pub fn rows_cleaned(&self) -> usize {
        self.stage(PipelineStage::Impute).map_or(0, |r| r.rows_out)
    }

    pub fn rows_balanced(&self) -> usize {
        self.stage(PipelineStage::Balance).map_or(0, |r| r.rows_out)
    }
}

/// Artifacts handed to training
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Scaled, balanced feature matrix (rows x features)
    pub matrix: Array2<f64>,
    pub labels: Vec<Label>,
    pub splits: Vec<TemporalFold>,
    /// Column order of `matrix`
    pub feature_names: Vec<String>,
    /// Scaler fitted on the balanced features
    pub scaler: RobustScaler,
    pub report: PipelineReport,
}

impl PipelineOutput {
    pub fn n_samples(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.matrix.ncols()
    }

    /// Fold whose test block is used for reported metrics
    pub fn final_split(&self) -> Option<&TemporalFold> {
        self.splits.last()
    }
}

/// Attach stage context and the stages completed so far to an error escaping `stage`
fn at_stage<T>(
    report: &PipelineReport,
    stage: PipelineStage,
    rows: usize,
    result: Result<T>,
) -> Result<T> {
    result.map_err(|e| e.in_stage(stage.name(), rows).with_report(report.clone()))
}

/// Split an engineered table into model inputs and binary labels
pub fn select_features(table: &KoiTable) -> Result<(KoiTable, Vec<Label>)> {
    let raw = table
        .numeric(LABEL)
        .ok_or_else(|| ExoplanetError::MissingColumn(LABEL.to_string()))?;

    let labels = raw
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if *v == 0.0 || *v == 1.0 => Ok(*v as Label),
            other => Err(ExoplanetError::Validation(format!(
                "row {} has label {:?}, expected 0 or 1",
                row, other
            ))),
        })
        .collect::<Result<Vec<Label>>>()?;

    Ok((table.without_columns(&NON_FEATURE_COLUMNS), labels))
}

/// Load → clean → engineer → finalize
#[derive(Debug, Clone)]
pub struct ExoplanetPipeline {
    config: PipelineConfig,
    cleaner: DataCleaner,
    creator: FeatureCreator,
    finalizer: DataFinalizer,
}

impl ExoplanetPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: DataCleaner::new(config.clone()),
            creator: FeatureCreator::new(&config),
            finalizer: DataFinalizer::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on the catalog at `source`
    pub fn run(&self, source: &Path) -> Result<PipelineOutput> {
        log::info!("Starting preprocessing pipeline for {}", source.display());
        let loaded = at_stage(
            &PipelineReport::default(),
            PipelineStage::Load,
            0,
            self.cleaner.load_and_select(source),
        )?;
        self.run_table(&loaded)
    }

    /// Run every stage after loading, starting from a labelled table
    pub fn run_table(&self, loaded: &KoiTable) -> Result<PipelineOutput> {
        let mut report = PipelineReport::default();
        report.record(PipelineStage::Load, loaded.n_rows(), loaded.n_rows(), loaded.n_cols());

        // Cleaning
        let rows = loaded.n_rows();
        let (filtered, filter_report) = at_stage(
            &report,
            PipelineStage::Filter,
            rows,
            self.cleaner.apply_scientific_filters_with_report(loaded),
        )?;
        report.record(PipelineStage::Filter, rows, filtered.n_rows(), filtered.n_cols());
        report.filter = Some(filter_report);

        let rows = filtered.n_rows();
        let cleaned = at_stage(
            &report,
            PipelineStage::Impute,
            rows,
            self.cleaner.handle_missing_values(&filtered),
        )?;
        report.record(PipelineStage::Impute, rows, cleaned.n_rows(), cleaned.n_cols());

        let distribution = label_distribution(&cleaned);
        log::info!("Cleaned label distribution: {:?}", distribution);

        // Feature engineering
        let rows = cleaned.n_rows();
        let physics = at_stage(
            &report,
            PipelineStage::AstronomicalFeatures,
            rows,
            self.creator.create_astronomical_features(&cleaned),
        )?;
        report.record(PipelineStage::AstronomicalFeatures, rows, physics.n_rows(), physics.n_cols());

        let engineered = at_stage(
            &report,
            PipelineStage::StatisticalFeatures,
            rows,
            self.creator.create_statistical_features(&physics),
        )?;
        report.record(
            PipelineStage::StatisticalFeatures,
            rows,
            engineered.n_rows(),
            engineered.n_cols(),
        );

        let (features, labels) = at_stage(
            &report,
            PipelineStage::SelectFeatures,
            rows,
            select_features(&engineered),
        )?;
        report.record(PipelineStage::SelectFeatures, rows, features.n_rows(), features.n_cols());

        // Finalization
        let (balanced, balanced_labels) = at_stage(
            &report,
            PipelineStage::Balance,
            rows,
            self.finalizer.balance_classes(&features, &labels),
        )?;
        report.record(PipelineStage::Balance, rows, balanced.n_rows(), balanced.n_cols());

        // scaling drops column names, so the manifest is fixed here
        let feature_names: Vec<String> = balanced
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = balanced.n_rows();
        let (matrix, scaler) = at_stage(
            &report,
            PipelineStage::Scale,
            rows,
            self.finalizer.scale_features(&balanced),
        )?;
        report.record(PipelineStage::Scale, rows, matrix.nrows(), matrix.ncols());

        let splits = at_stage(
            &report,
            PipelineStage::Split,
            rows,
            self.finalizer.create_temporal_splits(&matrix, &balanced_labels),
        )?;
        report.record(PipelineStage::Split, rows, matrix.nrows(), matrix.ncols());

        let mut class_counts: Vec<(Label, usize)> = class_indices(&balanced_labels)
            .into_iter()
            .map(|(label, rows)| (label, rows.len()))
            .collect();
        class_counts.sort_unstable();
        report.class_counts = class_counts;
        report.feature_count = feature_names.len();
        report.fold_count = splits.len();

        log::info!(
            "Pipeline complete: {} samples, {} features, {} folds",
            matrix.nrows(),
            feature_names.len(),
            splits.len()
        );

        Ok(PipelineOutput {
            matrix,
            labels: balanced_labels,
            splits,
            feature_names,
            scaler,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::types::{KEPID, PERIOD};

    #[test]
    fn test_stage_names_in_order() {
        let names: Vec<&str> = PipelineStage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&"load_and_select"));
        assert_eq!(names.last(), Some(&"create_temporal_splits"));
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_select_features_drops_identifier_and_label() {
        let table = KoiTable::from_columns(vec![
            Column::text(KEPID, vec![Some("1".into()), Some("2".into())]),
            Column::numeric(PERIOD, vec![Some(3.0), Some(4.0)]),
            Column::numeric(LABEL, vec![Some(1.0), Some(0.0)]),
        ])
        .unwrap();

        let (features, labels) = select_features(&table).unwrap();
        assert_eq!(features.column_names(), vec![PERIOD]);
        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn test_select_features_rejects_unlabelled_rows() {
        let table = KoiTable::from_columns(vec![Column::numeric(LABEL, vec![Some(1.0), None])]).unwrap();
        assert!(matches!(
            select_features(&table),
            Err(ExoplanetError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig::default().with_fold_count(0);
        assert!(ExoplanetPipeline::new(config).is_err());
    }

    #[test]
    fn test_stage_error_carries_context() {
        // every row fails the period bound
        let table = KoiTable::from_columns(vec![
            Column::numeric(LABEL, vec![Some(1.0), Some(0.0)]),
            Column::numeric(PERIOD, vec![Some(0.1), Some(0.2)]),
        ])
        .unwrap();

        let pipeline = ExoplanetPipeline::new(PipelineConfig::default()).unwrap();
        let err = pipeline.run_table(&table).unwrap_err();
        match &err {
            ExoplanetError::Stage { stage, rows, .. } => {
                assert_eq!(stage, "apply_scientific_filters");
                assert_eq!(*rows, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(err.root_cause(), ExoplanetError::InsufficientData { .. }));

        let partial = err.partial_report().unwrap();
        assert_eq!(partial.stages.len(), 1);
        assert_eq!(partial.rows_loaded(), 2);
        assert!(err.to_string().contains("after load_and_select: 2 -> 2 rows"));
    }

    #[test]
    fn test_balance_failure_keeps_earlier_row_counts() {
        let n = 12;
        let table = KoiTable::from_columns(vec![
            Column::text(KEPID, (0..n).map(|i| Some(i.to_string())).collect()),
            Column::numeric(LABEL, vec![Some(1.0); n]),
            Column::numeric(PERIOD, (0..n).map(|i| Some(5.0 + i as f64)).collect()),
        ])
        .unwrap();
        let config = PipelineConfig::default().with_domain_bounds(Vec::new());
        let err = ExoplanetPipeline::new(config)
            .unwrap()
            .run_table(&table)
            .unwrap_err();

        let partial = err.partial_report().unwrap();
        let last = partial.stages.last().unwrap();
        assert_eq!(last.stage, PipelineStage::SelectFeatures);
        assert_eq!((last.rows_in, last.rows_out), (n, n));
        assert_eq!(partial.rows_cleaned(), n);
        assert!(err.to_string().contains("after select_features: 12 -> 12 rows"));
        assert!(matches!(err.root_cause(), ExoplanetError::Validation(_)));
    }
}
