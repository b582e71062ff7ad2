//! Feature-name manifest and fixed-length feature vectors

use crate::error::{ExoplanetError, Result};
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

/// Ordered model input names, fixed when the model is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureManifest {
    names: Arc<[String]>,
    positions: HashMap<String, usize>,
}

impl FeatureManifest {
    /// Build a manifest; duplicate or empty name lists are rejected
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(ExoplanetError::Validation(
                "feature manifest is empty".to_string(),
            ));
        }

        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(ExoplanetError::Validation(format!(
                    "duplicate feature '{}' in manifest",
                    name
                )));
            }
        }

        Ok(Self {
            names: names.into(),
            positions,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Order a name → value mapping by the manifest.
    ///
    /// Missing names are reported first, in manifest order; otherwise any
    /// name the manifest does not know is reported, sorted. NaN or infinite
    /// values are rejected last.
    pub fn vector_from_map(&self, values: &HashMap<String, f64>) -> Result<FeatureVector> {
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !values.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ExoplanetError::MissingFeatures { missing });
        }

        let mut unknown: Vec<String> = values
            .keys()
            .filter(|name| !self.positions.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ExoplanetError::UnknownFeatures { unknown });
        }

        let ordered: Vec<f64> = self.names.iter().map(|name| values[name.as_str()]).collect();
        self.check_finite(&ordered)?;
        Ok(FeatureVector {
            values: ordered,
            manifest: Arc::clone(&self.names),
        })
    }

    /// Wrap an already ordered slice, checking its length and finiteness
    pub fn vector_from_slice(&self, values: &[f64]) -> Result<FeatureVector> {
        if values.len() != self.len() {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.check_finite(values)?;
        Ok(FeatureVector {
            values: values.to_vec(),
            manifest: Arc::clone(&self.names),
        })
    }

    /// `values` must already be in manifest order
    fn check_finite(&self, values: &[f64]) -> Result<()> {
        let features: Vec<String> = self
            .names
            .iter()
            .zip(values)
            .filter(|(_, v)| !v.is_finite())
            .map(|(name, _)| name.clone())
            .collect();
        if features.is_empty() {
            Ok(())
        } else {
            Err(ExoplanetError::NonFiniteFeatures { features })
        }
    }

    /// Names present in both manifests but at different positions, plus names
    /// present in only one of them
    pub fn differences(&self, other: &FeatureManifest) -> Vec<String> {
        let ours: HashSet<&str> = self.names.iter().map(String::as_str).collect();
        let theirs: HashSet<&str> = other.names.iter().map(String::as_str).collect();
        let mut diff: Vec<String> = ours
            .symmetric_difference(&theirs)
            .map(|s| s.to_string())
            .collect();
        for (idx, name) in self.names.iter().enumerate() {
            if matches!(other.position(name), Some(pos) if pos != idx) {
                diff.push(name.clone());
            }
        }
        diff.sort();
        diff
    }
}

/// Raw feature values in manifest order; only a manifest can build one
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
    manifest: Arc<[String]>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.manifest
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// True if the vector was built against a manifest with these names
    pub fn matches(&self, manifest: &FeatureManifest) -> bool {
        *self.manifest == *manifest.names()
    }
}
