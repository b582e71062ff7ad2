//! Error types for exoplanet_ml

use crate::pipeline::PipelineReport;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for exoplanet_ml
#[derive(Error, Debug)]
pub enum ExoplanetError {
    // ========== Load errors ==========
    #[error("Failed to load '{path}': {message}")]
    Load { path: PathBuf, message: String },

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========== Data-sufficiency errors ==========
    #[error("Insufficient data in {stage}: {message}")]
    InsufficientData { stage: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure of a pipeline stage, with the untouched inner error as source.
    /// `report` holds the row counts of the stages that completed before it.
    #[error("Pipeline stage '{stage}' failed with {rows} input rows{}: {source}", completed_summary(.report))]
    Stage {
        stage: String,
        rows: usize,
        report: Option<Box<PipelineReport>>,
        #[source]
        source: Box<ExoplanetError>,
    },

    // ========== Serving shape errors (client input) ==========
    #[error("Missing features: {}", missing.join(", "))]
    MissingFeatures { missing: Vec<String> },

    #[error("Unknown features: {}", unknown.join(", "))]
    UnknownFeatures { unknown: Vec<String> },

    #[error("Feature count mismatch: expected {expected}, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("Non-finite values for features: {}", features.join(", "))]
    NonFiniteFeatures { features: Vec<String> },

    // ========== Training errors ==========
    #[error("Shape error: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model has not been fitted")]
    ModelNotFitted,

    // ========== Persistence / configuration ==========
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExoplanetError {
    /// Wrap an error with the pipeline stage it escaped from
    pub fn in_stage(self, stage: impl Into<String>, rows: usize) -> Self {
        ExoplanetError::Stage {
            stage: stage.into(),
            rows,
            report: None,
            source: Box::new(self),
        }
    }

    /// Attach the partial report of the run to a stage error; other errors
    /// are returned unchanged
    pub fn with_report(self, partial: PipelineReport) -> Self {
        match self {
            ExoplanetError::Stage {
                stage, rows, source, ..
            } => ExoplanetError::Stage {
                stage,
                rows,
                report: Some(Box::new(partial)),
                source,
            },
            other => other,
        }
    }

    /// Stage records completed before a pipeline failure
    pub fn partial_report(&self) -> Option<&PipelineReport> {
        match self {
            ExoplanetError::Stage { report, .. } => report.as_deref(),
            _ => None,
        }
    }

    /// The innermost error, with any stage context peeled off
    pub fn root_cause(&self) -> &ExoplanetError {
        match self {
            ExoplanetError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True for errors caused by the caller's feature input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.root_cause(),
            ExoplanetError::MissingFeatures { .. }
                | ExoplanetError::UnknownFeatures { .. }
                | ExoplanetError::FeatureCountMismatch { .. }
                | ExoplanetError::NonFiniteFeatures { .. }
        )
    }

    pub(crate) fn insufficient(stage: &str, message: impl Into<String>) -> Self {
        ExoplanetError::InsufficientData {
            stage: stage.to_string(),
            message: message.into(),
        }
    }
}

fn completed_summary(report: &Option<Box<PipelineReport>>) -> String {
    match report.as_deref().and_then(|r| r.stages.last()) {
        Some(last) => format!(
            " (after {}: {} -> {} rows)",
            last.stage, last.rows_in, last.rows_out
        ),
        None => String::new(),
    }
}

/// Result type alias for exoplanet_ml operations
pub type Result<T> = std::result::Result<T, ExoplanetError>;
