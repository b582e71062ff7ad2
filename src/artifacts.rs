//! Persisted training artifacts
//!
//! A models directory holds four JSON files, written once per training run
//! and read by every serving instance:
//!
//! - `model.json`: model name, feature manifest, fitted scaler and ensemble
//! - `latest_metrics.json`: holdout metrics of the final fold
//! - `feature_importance.json`: feature name → importance
//! - `feature_names.json`: `{"feature_names": [...]}`
//!
//! Each file is written to a temporary file in the same directory and then
//! renamed over the target, so readers see either the old or the new file.

use crate::error::{ExoplanetError, Result};
use crate::training::{ClassificationMetrics, FeatureImportance, ModelBundle, TrainedModel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const MODEL_FILE: &str = "model.json";
pub const METRICS_FILE: &str = "latest_metrics.json";
pub const IMPORTANCE_FILE: &str = "feature_importance.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";

/// On-disk shape of the feature-name manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNamesFile {
    pub feature_names: Vec<String>,
}

/// Serialize `value` as pretty JSON and atomically replace `path`
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a JSON artifact, mapping a missing file to [`ExoplanetError::ArtifactNotFound`]
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ExoplanetError::ArtifactNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Directory of training artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    pub fn importance_path(&self) -> PathBuf {
        self.dir.join(IMPORTANCE_FILE)
    }

    pub fn feature_names_path(&self) -> PathBuf {
        self.dir.join(FEATURE_NAMES_FILE)
    }

    /// Persist every artifact of a training run.
    ///
    /// The model bundle is written last, so a reader that finds a new model
    /// also finds its metrics and manifest.
    pub fn save(&self, trained: &TrainedModel) -> Result<()> {
        self.save_metrics(&trained.metrics)?;
        self.save_importance(&trained.importance)?;
        self.save_feature_names(&trained.bundle.feature_names)?;
        self.save_bundle(&trained.bundle)?;
        Ok(())
    }

    pub fn save_bundle(&self, bundle: &ModelBundle) -> Result<()> {
        let path = self.model_path();
        write_json_atomic(&path, bundle)?;
        log::info!("Model bundle saved to {}", path.display());
        Ok(())
    }

    pub fn save_metrics(&self, metrics: &ClassificationMetrics) -> Result<()> {
        let path = self.metrics_path();
        write_json_atomic(&path, metrics)?;
        log::info!("Metrics saved to {}", path.display());
        Ok(())
    }

    pub fn save_importance(&self, importance: &FeatureImportance) -> Result<()> {
        let path = self.importance_path();
        write_json_atomic(&path, importance)?;
        log::info!("Feature importance saved to {}", path.display());
        Ok(())
    }

    pub fn save_feature_names(&self, names: &[String]) -> Result<()> {
        let path = self.feature_names_path();
        let file = FeatureNamesFile {
            feature_names: names.to_vec(),
        };
        write_json_atomic(&path, &file)?;
        log::info!("Feature names saved to {}", path.display());
        Ok(())
    }

    pub fn load_bundle(&self) -> Result<ModelBundle> {
        let bundle: ModelBundle = read_json(&self.model_path())?;
        if bundle.feature_names.len() != bundle.scaler.n_features()
            || bundle.feature_names.len() != bundle.ensemble.n_features()
        {
            return Err(ExoplanetError::ShapeError {
                expected: format!("{} features in scaler and ensemble", bundle.feature_names.len()),
                actual: format!(
                    "scaler {}, ensemble {}",
                    bundle.scaler.n_features(),
                    bundle.ensemble.n_features()
                ),
            });
        }
        Ok(bundle)
    }

    pub fn load_metrics(&self) -> Result<ClassificationMetrics> {
        read_json(&self.metrics_path())
    }

    pub fn load_importance(&self) -> Result<FeatureImportance> {
        read_json(&self.importance_path())
    }

    pub fn load_feature_names(&self) -> Result<Vec<String>> {
        let file: FeatureNamesFile = read_json(&self.feature_names_path())?;
        Ok(file.feature_names)
    }
}
