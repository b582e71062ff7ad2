//! Core types and KOI catalog column names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary class label: 0 = false positive, 1 = exoplanet
pub type Label = u8;

/// Kepler input catalog identifier
pub const KEPID: &str = "kepid";
/// Catalog disposition (confirmed / candidate / false positive)
pub const DISPOSITION: &str = "koi_disposition";
/// Derived binary label column
pub const LABEL: &str = "target_class";

pub const PERIOD: &str = "koi_period";
pub const DURATION: &str = "koi_duration";
pub const DEPTH: &str = "koi_depth";
pub const SNR: &str = "koi_model_snr";
pub const IMPACT: &str = "koi_impact";
pub const PLANET_RADIUS: &str = "koi_prad";
pub const STELLAR_TEMP: &str = "koi_steff";
pub const STELLAR_LOGG: &str = "koi_slogg";
pub const STELLAR_RADIUS: &str = "koi_srad";
pub const STELLAR_MASS: &str = "koi_smass";

/// Allow-list of raw columns kept by the loader, in output order
pub const CRITICAL_COLUMNS: [&str; 12] = [
    KEPID,
    DISPOSITION,
    PERIOD,
    DURATION,
    DEPTH,
    SNR,
    IMPACT,
    PLANET_RADIUS,
    STELLAR_TEMP,
    STELLAR_LOGG,
    STELLAR_RADIUS,
    STELLAR_MASS,
];

/// Raw columns read as text rather than numbers
pub const TEXT_COLUMNS: [&str; 2] = [KEPID, DISPOSITION];

/// Columns never used as model inputs
pub const NON_FEATURE_COLUMNS: [&str; 2] = [KEPID, LABEL];

// Derived column names
pub const ORBITAL_DISTANCE: &str = "orbital_distance_au";
pub const PLANET_RADIUS_EARTH: &str = "planet_radius_earth";
pub const DURATION_PERIOD_RATIO: &str = "duration_period_ratio";
pub const STELLAR_LUMINOSITY: &str = "stellar_luminosity_proxy";
pub const EQUILIBRIUM_TEMP: &str = "equilibrium_temp";
pub const HABITABLE_ZONE: &str = "habitable_zone";
pub const LOG_SNR: &str = "log_snr";
pub const SNR_HIGH_QUALITY: &str = "snr_high_quality";

/// Suffixes of dataset-level statistical columns
pub const STAT_SUFFIXES: [&str; 3] = ["_skew", "_kurt", "_cv"];

/// Catalog verdict on a transit candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl Disposition {
    /// Parse a catalog disposition, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "confirmed" => Some(Disposition::Confirmed),
            "candidate" => Some(Disposition::Candidate),
            "false positive" | "false_positive" | "false-positive" => {
                Some(Disposition::FalsePositive)
            }
            _ => None,
        }
    }

    /// Confirmed planets and open candidates both count as exoplanets
    pub fn is_exoplanet(&self) -> bool {
        matches!(self, Disposition::Confirmed | Disposition::Candidate)
    }
}

/// Map a raw disposition string to its binary label.
///
/// Anything other than confirmed/candidate is labelled 0.
pub fn label_for_disposition(raw: &str) -> Label {
    match Disposition::parse(raw) {
        Some(d) if d.is_exoplanet() => 1,
        _ => 0,
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Disposition::Confirmed => write!(f, "CONFIRMED"),
            Disposition::Candidate => write!(f, "CANDIDATE"),
            Disposition::FalsePositive => write!(f, "FALSE POSITIVE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_parse_case_insensitive() {
        assert_eq!(Disposition::parse("CONFIRMED"), Some(Disposition::Confirmed));
        assert_eq!(Disposition::parse("  Candidate "), Some(Disposition::Candidate));
        assert_eq!(
            Disposition::parse("FALSE POSITIVE"),
            Some(Disposition::FalsePositive)
        );
        assert_eq!(Disposition::parse("refuted"), None);
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(label_for_disposition("confirmed"), 1);
        assert_eq!(label_for_disposition("CANDIDATE"), 1);
        assert_eq!(label_for_disposition("FALSE POSITIVE"), 0);
        assert_eq!(label_for_disposition("not dispositioned"), 0);
    }
}
