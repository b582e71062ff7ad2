//! # Exoplanet-ML
//!
//! Preprocessing and classification of Kepler Objects of Interest (KOI).
//!
//! A NASA KOI export is loaded, restricted to the critical columns, filtered
//! by physical plausibility, imputed, enriched with astronomical and
//! dataset-level statistical features, balanced, robust-scaled and split into
//! forward-chaining temporal folds. The result feeds a soft-voting ensemble
//! (random forest + logistic regression) whose artifacts are persisted for a
//! serving adapter.
//!
//! ## Example
//!
//! ```rust,no_run
//! use exoplanet_ml::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let pipeline = ExoplanetPipeline::new(PipelineConfig::default())?;
//!     let output = pipeline.run(Path::new("data/cumulative.csv"))?;
//!
//!     let trainer = ModelTrainer::new(TrainingConfig::default())?;
//!     let trained = trainer.train(&output)?;
//!     ArtifactStore::new("models").save(&trained)?;
//!
//!     let service = ExoplanetService::new(EnsembleRepository::load(Path::new("models"))?);
//!     println!("{:?}", service.repository().feature_names());
//!     Ok(())
//! }
//! ```

pub mod artifacts;
pub mod cleaning;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod finalize;
pub mod pipeline;
pub mod serving;
pub mod training;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::artifacts::ArtifactStore;
    pub use crate::cleaning::DataCleaner;
    pub use crate::config::{PipelineConfig, TrainingConfig};
    pub use crate::data::KoiTable;
    pub use crate::error::{ExoplanetError, Result};
    pub use crate::features::FeatureCreator;
    pub use crate::finalize::{DataFinalizer, RobustScaler, TemporalFold};
    pub use crate::pipeline::{ExoplanetPipeline, PipelineOutput, PipelineReport, PipelineStage};
    pub use crate::serving::{
        AstronomicalParams, ClassificationResult, EnsembleRepository, ExoplanetService,
        FeatureManifest, FeatureVector, ModelRepository, Prediction,
    };
    pub use crate::training::{
        ClassificationMetrics, FeatureImportance, ModelBundle, ModelTrainer, TrainedModel,
    };
    pub use crate::types::*;
}
