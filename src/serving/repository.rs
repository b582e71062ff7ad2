//! Model repository abstraction and the ensemble-backed implementation

use super::manifest::{FeatureManifest, FeatureVector};
use crate::artifacts::ArtifactStore;
use crate::error::{ExoplanetError, Result};
use crate::training::{ClassificationMetrics, FeatureImportance, ModelBundle};
use crate::types::Label;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Classification of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1 = exoplanet, 0 = false positive
    pub label: Label,
    /// Positive-class probability in [0, 1]
    pub confidence: f64,
    pub model_name: String,
}

/// Capability set every servable model provides
pub trait ModelRepository: Send + Sync {
    /// Load the persisted model from a models directory
    fn load(dir: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Manifest that input vectors must be built against
    fn manifest(&self) -> &FeatureManifest;

    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    fn feature_names(&self) -> &[String] {
        self.manifest().names()
    }

    fn feature_importance(&self) -> Option<FeatureImportance>;

    fn metrics(&self) -> Option<ClassificationMetrics>;

    fn model_name(&self) -> &str;
}

/// Serves the soft-voting ensemble persisted by training
#[derive(Debug, Clone)]
pub struct EnsembleRepository {
    bundle: ModelBundle,
    manifest: FeatureManifest,
    importance: Option<FeatureImportance>,
    metrics: Option<ClassificationMetrics>,
}

impl EnsembleRepository {
    /// Wrap an in-memory bundle, e.g. straight after training
    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        let manifest = FeatureManifest::new(bundle.feature_names.clone())?;
        if manifest.len() != bundle.scaler.n_features() {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: manifest.len(),
                actual: bundle.scaler.n_features(),
            });
        }
        Ok(Self {
            bundle,
            manifest,
            importance: None,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: ClassificationMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_importance(mut self, importance: FeatureImportance) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }
}

/// Absent optional artifacts are skipped; unreadable ones fail the load
fn optional<T>(name: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ExoplanetError::ArtifactNotFound(path)) => {
            log::debug!("No {} artifact at {}", name, path.display());
            Ok(None)
        }
        Err(e) => {
            log::error!("Failed to load {} artifact: {}", name, e);
            Err(e)
        }
    }
}

impl ModelRepository for EnsembleRepository {
    fn load(dir: &Path) -> Result<Self> {
        let store = ArtifactStore::new(dir);
        log::info!("Loading model from {}", store.model_path().display());

        let bundle = store.load_bundle()?;
        let mut repository = Self::from_bundle(bundle)?;

        if let Some(names) = optional("feature names", store.load_feature_names())? {
            let published = FeatureManifest::new(names)?;
            let diff = repository.manifest.differences(&published);
            if !diff.is_empty() {
                log::warn!(
                    "feature_names.json disagrees with the model manifest on {:?}; using the model's",
                    diff
                );
            }
        }
        repository.metrics = optional("metrics", store.load_metrics())?;
        repository.importance = optional("feature importance", store.load_importance())?;

        log::info!(
            "Model '{}' loaded with {} features",
            repository.bundle.model_name,
            repository.manifest.len()
        );
        Ok(repository)
    }

    fn manifest(&self) -> &FeatureManifest {
        &self.manifest
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        if !features.matches(&self.manifest) {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: self.manifest.len(),
                actual: features.len(),
            });
        }

        let (label, confidence) = self.bundle.predict_raw(features.values())?;
        log::info!("Prediction: class={}, confidence={:.4}", label, confidence);
        Ok(Prediction {
            label,
            confidence,
            model_name: self.bundle.model_name.clone(),
        })
    }

    fn feature_importance(&self) -> Option<FeatureImportance> {
        self.importance.clone()
    }

    fn metrics(&self) -> Option<ClassificationMetrics> {
        self.metrics.clone()
    }

    fn model_name(&self) -> &str {
        &self.bundle.model_name
    }
}
