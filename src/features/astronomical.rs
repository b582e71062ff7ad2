//! Physics-derived transit features
//!
//! Each group is added only when all of its inputs are present in the table.
//! Missing inputs skip the group; nothing is synthesized.

use crate::data::KoiTable;
use crate::error::Result;
use crate::types::{
    DEPTH, DURATION, DURATION_PERIOD_RATIO, EQUILIBRIUM_TEMP, HABITABLE_ZONE, LOG_SNR,
    ORBITAL_DISTANCE, PERIOD, PLANET_RADIUS_EARTH, SNR, SNR_HIGH_QUALITY, STELLAR_LUMINOSITY,
    STELLAR_MASS, STELLAR_RADIUS, STELLAR_TEMP,
};

/// Guard against division by zero and log/sqrt of zero
pub const EPSILON: f64 = 1e-10;
pub const DAYS_PER_YEAR: f64 = 365.25;
/// Solar radius in Earth radii
pub const SOLAR_TO_EARTH_RADII: f64 = 109.2;
/// Solar effective temperature (K)
pub const SUN_TEMPERATURE_K: f64 = 5778.0;
pub const PPM: f64 = 1e6;

/// Habitable equilibrium temperature range (K), inclusive
pub const HABITABLE_TEMP_MIN: f64 = 250.0;
pub const HABITABLE_TEMP_MAX: f64 = 350.0;
/// SNR above which a detection counts as high quality
pub const HIGH_QUALITY_SNR: f64 = 15.0;

const KEPLER_GROUP: [&str; 5] = [PERIOD, STELLAR_MASS, DURATION, DEPTH, STELLAR_RADIUS];
const HABITABILITY_GROUP: [&str; 2] = [STELLAR_TEMP, STELLAR_RADIUS];

/// Semi-major axis (AU) from Kepler's third law, stellar mass in solar masses
pub fn orbital_distance_au(period_days: f64, stellar_mass: f64) -> f64 {
    ((period_days / DAYS_PER_YEAR).powi(2) * stellar_mass).cbrt()
}

/// Planet radius in Earth radii from transit depth (ppm) and stellar radius (solar radii)
pub fn planet_radius_earth(depth_ppm: f64, stellar_radius: f64) -> f64 {
    (depth_ppm / PPM + EPSILON).sqrt() * stellar_radius * SOLAR_TO_EARTH_RADII
}

pub fn duration_period_ratio(duration: f64, period: f64) -> f64 {
    duration / (period + EPSILON)
}

/// Sun-normalized Stefan-Boltzmann luminosity
pub fn stellar_luminosity_proxy(stellar_radius: f64, stellar_temp: f64) -> f64 {
    stellar_radius.powi(2) * (stellar_temp / SUN_TEMPERATURE_K).powi(4)
}

pub fn equilibrium_temperature(stellar_temp: f64, stellar_radius: f64, orbital_distance: f64) -> f64 {
    stellar_temp * (stellar_radius / (2.0 * orbital_distance + EPSILON)).sqrt()
}

pub fn in_habitable_zone(equilibrium_temp: f64) -> bool {
    (HABITABLE_TEMP_MIN..=HABITABLE_TEMP_MAX).contains(&equilibrium_temp)
}

pub fn log_snr(snr: f64) -> f64 {
    (snr + EPSILON).log10()
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn map1(a: &[Option<f64>], f: impl Fn(f64) -> f64) -> Vec<Option<f64>> {
    a.iter().map(|x| x.map(&f)).collect()
}

fn map2(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

fn map3(
    a: &[Option<f64>],
    b: &[Option<f64>],
    c: &[Option<f64>],
    f: impl Fn(f64, f64, f64) -> f64,
) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((x, y), z)| match (x, y, z) {
            (Some(x), Some(y), Some(z)) => Some(f(*x, *y, *z)),
            _ => None,
        })
        .collect()
}

fn numeric(table: &KoiTable, name: &str) -> Vec<Option<f64>> {
    table.numeric(name).map(|v| v.to_vec()).unwrap_or_default()
}

/// Copy of `table` with the physics feature columns appended
pub fn create_astronomical_features(table: &KoiTable) -> Result<KoiTable> {
    let mut out = table.clone();

    // Kepler geometry
    if table.has_columns(&KEPLER_GROUP) {
        let period = numeric(table, PERIOD);
        let mass = numeric(table, STELLAR_MASS);
        let duration = numeric(table, DURATION);
        let depth = numeric(table, DEPTH);
        let srad = numeric(table, STELLAR_RADIUS);

        out.set_numeric(ORBITAL_DISTANCE, map2(&period, &mass, orbital_distance_au))?;
        out.set_numeric(PLANET_RADIUS_EARTH, map2(&depth, &srad, planet_radius_earth))?;
        out.set_numeric(
            DURATION_PERIOD_RATIO,
            map2(&duration, &period, duration_period_ratio),
        )?;
    } else {
        log::warn!(
            "Skipping Kepler geometry features, missing one of {:?}",
            KEPLER_GROUP
        );
    }

    // Habitability
    if table.has_columns(&HABITABILITY_GROUP) {
        let steff = numeric(table, STELLAR_TEMP);
        let srad = numeric(table, STELLAR_RADIUS);

        out.set_numeric(
            STELLAR_LUMINOSITY,
            map2(&srad, &steff, stellar_luminosity_proxy),
        )?;

        // equilibrium temperature depends on the orbital distance computed above
        if let Some(distance) = out.numeric(ORBITAL_DISTANCE).map(|d| d.to_vec()) {
            let teq = map3(&steff, &srad, &distance, equilibrium_temperature);
            let zone = map1(&teq, |t| flag(in_habitable_zone(t)));
            out.set_numeric(EQUILIBRIUM_TEMP, teq)?;
            out.set_numeric(HABITABLE_ZONE, zone)?;
        } else {
            log::warn!("Skipping equilibrium temperature, orbital distance unavailable");
        }
    } else {
        log::warn!(
            "Skipping habitability features, missing one of {:?}",
            HABITABILITY_GROUP
        );
    }

    // Signal quality
    if table.has_column(SNR) {
        let snr = numeric(table, SNR);
        out.set_numeric(LOG_SNR, map1(&snr, log_snr))?;
        out.set_numeric(SNR_HIGH_QUALITY, map1(&snr, |s| flag(s > HIGH_QUALITY_SNR)))?;
    } else {
        log::warn!("Skipping signal-quality features, '{}' not present", SNR);
    }

    log::info!(
        "Physics features created. Total columns: {}",
        out.n_cols()
    );
    Ok(out)
}
