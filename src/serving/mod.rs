//! Serving adapter for persisted models
//!
//! A [`ModelRepository`] exposes a loaded model behind a fixed
//! [`FeatureManifest`]. Callers build a [`FeatureVector`] from named values
//! through the manifest, so a vector with the wrong names or length never
//! reaches the model. [`ExoplanetService`] adds the habitability evaluation
//! on top of a prediction.

pub mod manifest;
pub mod repository;
pub mod service;

pub use manifest::{FeatureManifest, FeatureVector};
pub use repository::{EnsembleRepository, ModelRepository, Prediction};
pub use service::{
    AstronomicalParams, ClassificationResult, Exoplanet, ExoplanetService, EARTH_SIZE_RANGE,
    HABITABLE_TEMP_RANGE, MIN_HABITABLE_CONFIDENCE,
};
