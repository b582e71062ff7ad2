//! Classification plus habitability evaluation

use super::repository::{ModelRepository, Prediction};
use crate::error::Result;
use crate::types::Label;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Equilibrium temperature window in Kelvin
pub const HABITABLE_TEMP_RANGE: (f64, f64) = (250.0, 350.0);
/// Planet radius window in Earth radii
pub const EARTH_SIZE_RANGE: (f64, f64) = (0.5, 2.0);
pub const MIN_HABITABLE_CONFIDENCE: f64 = 0.90;

/// A classified candidate with the attributes habitability depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exoplanet {
    pub kepid: String,
    pub period_days: f64,
    pub radius_earth: f64,
    pub equilibrium_temp: f64,
    pub confidence_score: f64,
}

impl Exoplanet {
    /// Inside the temperature window, roughly Earth sized, and detected with
    /// high confidence. All bounds are inclusive.
    pub fn is_potentially_habitable(&self) -> bool {
        let in_zone = (HABITABLE_TEMP_RANGE.0..=HABITABLE_TEMP_RANGE.1)
            .contains(&self.equilibrium_temp);
        let earth_size = (EARTH_SIZE_RANGE.0..=EARTH_SIZE_RANGE.1).contains(&self.radius_earth);
        let confident = self.confidence_score >= MIN_HABITABLE_CONFIDENCE;
        in_zone && earth_size && confident
    }
}

/// Physical parameters supplied alongside the model features.
///
/// Absent values default to 0, which never passes the habitability windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AstronomicalParams {
    #[serde(default)]
    pub kepid: Option<String>,
    #[serde(default)]
    pub koi_period: Option<f64>,
    #[serde(default)]
    pub koi_prad: Option<f64>,
    #[serde(default)]
    pub koi_teq: Option<f64>,
}

impl AstronomicalParams {
    pub fn new(kepid: impl Into<String>) -> Self {
        Self {
            kepid: Some(kepid.into()),
            ..Self::default()
        }
    }

    pub fn with_period(mut self, days: f64) -> Self {
        self.koi_period = Some(days);
        self
    }

    pub fn with_radius(mut self, earth_radii: f64) -> Self {
        self.koi_prad = Some(earth_radii);
        self
    }

    pub fn with_equilibrium_temp(mut self, kelvin: f64) -> Self {
        self.koi_teq = Some(kelvin);
        self
    }

    fn to_exoplanet(&self, confidence_score: f64) -> Exoplanet {
        Exoplanet {
            kepid: self.kepid.clone().unwrap_or_else(|| "N/A".to_string()),
            period_days: self.koi_period.unwrap_or(0.0),
            radius_earth: self.koi_prad.unwrap_or(0.0),
            equilibrium_temp: self.koi_teq.unwrap_or(0.0),
            confidence_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub prediction: Label,
    pub confidence: f64,
    pub model_name: String,
    pub is_potentially_habitable: bool,
}

impl ClassificationResult {
    fn from_prediction(prediction: Prediction, is_potentially_habitable: bool) -> Self {
        Self {
            prediction: prediction.label,
            confidence: prediction.confidence,
            model_name: prediction.model_name,
            is_potentially_habitable,
        }
    }
}

/// Application service over any [`ModelRepository`]
pub struct ExoplanetService<R: ModelRepository> {
    repository: R,
}

impl<R: ModelRepository> ExoplanetService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Classify a named feature mapping and evaluate habitability.
    ///
    /// Shape errors (missing or unknown feature names) and NaN or infinite
    /// values are returned before the model is consulted.
    pub fn classify_and_evaluate(
        &self,
        features: &HashMap<String, f64>,
        params: &AstronomicalParams,
    ) -> Result<ClassificationResult> {
        let vector = self.repository.manifest().vector_from_map(features)?;
        let prediction = self.repository.predict(&vector)?;

        let planet = params.to_exoplanet(prediction.confidence);
        let habitable = planet.is_potentially_habitable();
        log::info!("Habitability for {}: {}", planet.kepid, habitable);

        Ok(ClassificationResult::from_prediction(prediction, habitable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExoplanetError;
    use crate::serving::{FeatureManifest, FeatureVector};
    use crate::training::{ClassificationMetrics, FeatureImportance};
    use std::path::Path;

    /// Answers with a fixed confidence
    struct FixedRepository {
        manifest: FeatureManifest,
        confidence: f64,
    }

    impl FixedRepository {
        fn new(confidence: f64) -> Self {
            Self {
                manifest: FeatureManifest::new(vec!["koi_period".into(), "log_snr".into()])
                    .unwrap(),
                confidence,
            }
        }
    }

    impl ModelRepository for FixedRepository {
        fn load(_dir: &Path) -> Result<Self> {
            Ok(Self::new(0.5))
        }

        fn manifest(&self) -> &FeatureManifest {
            &self.manifest
        }

        fn predict(&self, _features: &FeatureVector) -> Result<Prediction> {
            Ok(Prediction {
                label: u8::from(self.confidence > 0.5),
                confidence: self.confidence,
                model_name: "fixed".to_string(),
            })
        }

        fn feature_importance(&self) -> Option<FeatureImportance> {
            None
        }

        fn metrics(&self) -> Option<ClassificationMetrics> {
            None
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn earth_like(confidence: f64) -> Exoplanet {
        Exoplanet {
            kepid: "TEST-01".to_string(),
            period_days: 100.0,
            radius_earth: 1.5,
            equilibrium_temp: 290.0,
            confidence_score: confidence,
        }
    }

    fn features() -> HashMap<String, f64> {
        [("koi_period", 100.0), ("log_snr", 1.4)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_habitability_rules() {
        assert!(earth_like(0.912).is_potentially_habitable());
        assert!(!earth_like(0.70).is_potentially_habitable());

        let boundary = Exoplanet {
            radius_earth: 2.0,
            equilibrium_temp: 350.0,
            ..earth_like(0.90)
        };
        assert!(boundary.is_potentially_habitable());

        let hot = Exoplanet {
            equilibrium_temp: 351.0,
            ..earth_like(0.99)
        };
        assert!(!hot.is_potentially_habitable());

        let giant = Exoplanet {
            radius_earth: 11.0,
            ..earth_like(0.99)
        };
        assert!(!giant.is_potentially_habitable());
    }

    #[test]
    fn test_classify_and_evaluate() {
        let service = ExoplanetService::new(FixedRepository::new(0.95));
        let params = AstronomicalParams::new("K00001")
            .with_period(100.0)
            .with_radius(1.2)
            .with_equilibrium_temp(288.0);

        let result = service.classify_and_evaluate(&features(), &params).unwrap();
        assert_eq!(result.prediction, 1);
        assert!(result.is_potentially_habitable);
        assert_eq!(result.model_name, "fixed");
    }

    #[test]
    fn test_missing_params_never_habitable() {
        let service = ExoplanetService::new(FixedRepository::new(0.99));
        let result = service
            .classify_and_evaluate(&features(), &AstronomicalParams::default())
            .unwrap();
        assert!(!result.is_potentially_habitable);
    }

    #[test]
    fn test_missing_feature_is_client_error() {
        let service = ExoplanetService::new(FixedRepository::new(0.99));
        let mut partial = features();
        partial.remove("log_snr");

        let err = service
            .classify_and_evaluate(&partial, &AstronomicalParams::default())
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(err, ExoplanetError::MissingFeatures { .. }));
    }

    #[test]
    fn test_nan_feature_is_client_error() {
        let service = ExoplanetService::new(FixedRepository::new(0.99));
        let mut values = features();
        values.insert("log_snr".to_string(), f64::NAN);

        let err = service
            .classify_and_evaluate(&values, &AstronomicalParams::default())
            .unwrap_err();
        assert!(err.is_client_error());
        match err {
            ExoplanetError::NonFiniteFeatures { features } => assert_eq!(features, vec!["log_snr"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
