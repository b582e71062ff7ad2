//! Pipeline and training configuration

use crate::error::{ExoplanetError, Result};
use crate::types::{DEPTH, DURATION, PERIOD, SNR};
use serde::{Deserialize, Serialize};

/// Inclusive validity range for one catalog field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBound {
    pub column: String,
    pub min: f64,
    pub max: f64,
    /// Human-readable reason, used in logs
    #[serde(default)]
    pub description: String,
}

impl DomainBound {
    pub fn new(column: &str, min: f64, max: f64, description: &str) -> Self {
        Self {
            column: column.to_string(),
            min,
            max,
            description: description.to_string(),
        }
    }

    /// Missing values never satisfy a bound
    pub fn contains(&self, value: Option<f64>) -> bool {
        matches!(value, Some(v) if v >= self.min && v <= self.max)
    }
}

/// NASA quality bounds applied by the cleaner, in application order
pub fn default_domain_bounds() -> Vec<DomainBound> {
    vec![
        DomainBound::new(PERIOD, 0.5, 1000.0, "Valid orbital period (days)"),
        DomainBound::new(DURATION, 0.5, 48.0, "Observable transit duration (hours)"),
        DomainBound::new(DEPTH, 10.0, 100_000.0, "Detectable transit depth (ppm)"),
        // 7.1 is the Kepler false-alarm threshold
        DomainBound::new(SNR, 7.1, 1000.0, "NASA SNR threshold"),
    ]
}

fn default_key_patterns() -> Vec<String> {
    ["period", "duration", "depth", "radius", "temp", "snr", "mass", "impact"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_fold_count() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_delimiter() -> char {
    ','
}

fn default_comment_prefix() -> Option<char> {
    Some('#')
}

fn default_min_stat_samples() -> usize {
    10
}

fn default_residual_drop_warn_ratio() -> f64 {
    0.01
}

/// Preprocessing pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of forward-chaining folds
    #[serde(default = "default_fold_count")]
    pub fold_count: usize,
    /// Seed for class resampling and shuffling
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    /// Field delimiter of the input table
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Lines starting with this character are skipped
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: Option<char>,
    #[serde(default = "default_domain_bounds")]
    pub domain_bounds: Vec<DomainBound>,
    /// Substrings selecting the columns that get dataset-level statistics
    #[serde(default = "default_key_patterns")]
    pub key_patterns: Vec<String>,
    /// A key column needs strictly more non-missing values than this
    #[serde(default = "default_min_stat_samples")]
    pub min_stat_samples: usize,
    /// Warn when the post-imputation row drop exceeds this fraction
    #[serde(default = "default_residual_drop_warn_ratio")]
    pub residual_drop_warn_ratio: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fold_count: default_fold_count(),
            random_seed: default_seed(),
            delimiter: default_delimiter(),
            comment_prefix: default_comment_prefix(),
            domain_bounds: default_domain_bounds(),
            key_patterns: default_key_patterns(),
            min_stat_samples: default_min_stat_samples(),
            residual_drop_warn_ratio: default_residual_drop_warn_ratio(),
        }
    }
}

impl PipelineConfig {
    pub fn with_fold_count(mut self, fold_count: usize) -> Self {
        self.fold_count = fold_count;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_domain_bounds(mut self, bounds: Vec<DomainBound>) -> Self {
        self.domain_bounds = bounds;
        self
    }

    pub fn with_key_patterns(mut self, patterns: Vec<String>) -> Self {
        self.key_patterns = patterns;
        self
    }

    /// Check values that would otherwise fail deep inside a stage
    pub fn validate(&self) -> Result<()> {
        if self.fold_count < 2 {
            return Err(ExoplanetError::Config(format!(
                "fold_count must be at least 2, got {}",
                self.fold_count
            )));
        }
        if !self.delimiter.is_ascii() {
            return Err(ExoplanetError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if let Some(prefix) = self.comment_prefix {
            if !prefix.is_ascii() {
                return Err(ExoplanetError::Config(format!(
                    "comment prefix must be ASCII, got {:?}",
                    prefix
                )));
            }
        }
        for bound in &self.domain_bounds {
            if bound.min > bound.max {
                return Err(ExoplanetError::Config(format!(
                    "bound for '{}' has min {} > max {}",
                    bound.column, bound.min, bound.max
                )));
            }
        }
        Ok(())
    }
}

fn default_model_name() -> String {
    "exoplanet-ensemble-v3".to_string()
}

fn default_n_estimators() -> usize {
    100
}

fn default_min_samples_leaf() -> usize {
    1
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_max_iter() -> usize {
    1000
}

fn default_l2_penalty() -> f64 {
    1e-4
}

/// Ensemble training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Trees in the random forest
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    /// Logistic regression step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_l2_penalty")]
    pub l2_penalty: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            n_estimators: default_n_estimators(),
            max_depth: None,
            min_samples_leaf: default_min_samples_leaf(),
            random_seed: default_seed(),
            learning_rate: default_learning_rate(),
            max_iter: default_max_iter(),
            l2_penalty: default_l2_penalty(),
        }
    }
}

impl TrainingConfig {
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ExoplanetError::Config(
                "n_estimators must be greater than 0".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ExoplanetError::Config(
                "min_samples_leaf must be greater than 0".to_string(),
            ));
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(ExoplanetError::Config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
