//! Synthetic KOI catalog generator shared by the integration tests

#![allow(dead_code)]

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use tempfile::NamedTempFile;

/// Column layout of a NASA cumulative KOI export, plus two columns the
/// loader must ignore
pub const HEADER: &str = "kepid,koi_disposition,koi_score,koi_period,koi_duration,koi_depth,\
koi_model_snr,koi_impact,koi_prad,koi_teq,koi_steff,koi_slogg,koi_srad,koi_smass";

/// Composition of a generated catalog
#[derive(Debug, Clone)]
pub struct CatalogShape {
    pub confirmed: usize,
    pub candidate: usize,
    pub false_positive: usize,
    /// Every n-th row gets an orbital period outside the valid range
    pub out_of_bounds_every: Option<usize>,
    /// Every n-th row has an empty impact parameter
    pub missing_impact_every: Option<usize>,
    pub seed: u64,
}

impl Default for CatalogShape {
    fn default() -> Self {
        Self {
            confirmed: 300,
            candidate: 200,
            false_positive: 500,
            out_of_bounds_every: Some(10),
            missing_impact_every: Some(7),
            seed: 7,
        }
    }
}

impl CatalogShape {
    pub fn balanced(rows_per_class: usize) -> Self {
        Self {
            confirmed: rows_per_class,
            candidate: 0,
            false_positive: rows_per_class,
            out_of_bounds_every: None,
            missing_impact_every: None,
            seed: 11,
        }
    }

    pub fn total(&self) -> usize {
        self.confirmed + self.candidate + self.false_positive
    }
}

fn planet_row(rng: &mut ChaCha8Rng) -> [f64; 10] {
    [
        rng.gen_range(1.0..400.0),    // period
        rng.gen_range(1.0..12.0),     // duration
        rng.gen_range(50.0..3000.0),  // depth
        rng.gen_range(15.0..300.0),   // snr
        rng.gen_range(0.0..0.7),      // impact
        rng.gen_range(0.8..6.0),      // prad
        rng.gen_range(4500.0..6500.0), // steff
        rng.gen_range(4.2..4.6),      // slogg
        rng.gen_range(0.7..1.4),      // srad
        rng.gen_range(0.7..1.3),      // smass
    ]
}

fn false_positive_row(rng: &mut ChaCha8Rng) -> [f64; 10] {
    [
        rng.gen_range(0.6..50.0),
        rng.gen_range(2.0..20.0),
        rng.gen_range(3000.0..60000.0),
        rng.gen_range(7.5..60.0),
        rng.gen_range(0.6..1.3),
        rng.gen_range(8.0..40.0),
        rng.gen_range(5000.0..9000.0),
        rng.gen_range(3.5..4.4),
        rng.gen_range(1.0..3.0),
        rng.gen_range(0.9..2.0),
    ]
}

/// CSV lines (without header) in a seeded, shuffled order
pub fn catalog_rows(shape: &CatalogShape) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(shape.seed);

    let mut dispositions: Vec<&str> = Vec::with_capacity(shape.total());
    dispositions.extend(std::iter::repeat("CONFIRMED").take(shape.confirmed));
    dispositions.extend(std::iter::repeat("CANDIDATE").take(shape.candidate));
    dispositions.extend(std::iter::repeat("FALSE POSITIVE").take(shape.false_positive));
    dispositions.shuffle(&mut rng);

    dispositions
        .iter()
        .enumerate()
        .map(|(idx, disposition)| {
            let mut v = if *disposition == "FALSE POSITIVE" {
                false_positive_row(&mut rng)
            } else {
                planet_row(&mut rng)
            };
            if matches!(shape.out_of_bounds_every, Some(n) if idx % n == n - 1) {
                v[0] = 1500.0;
            }
            let impact = match shape.missing_impact_every {
                Some(n) if idx % n == 0 => String::new(),
                _ => format!("{:.3}", v[4]),
            };
            let score: f64 = rng.gen_range(0.0..1.0);
            let teq: f64 = rng.gen_range(200.0..1500.0);
            format!(
                "{},{},{:.3},{:.5},{:.4},{:.1},{:.1},{},{:.2},{:.0},{:.0},{:.3},{:.3},{:.3}",
                10_000_000 + idx,
                disposition,
                score,
                v[0],
                v[1],
                v[2],
                v[3],
                impact,
                v[5],
                teq,
                v[6],
                v[7],
                v[8],
                v[9]
            )
        })
        .collect()
}

/// Write a catalog to a temporary `.csv` file with a NASA-style comment header
pub fn write_catalog(shape: &CatalogShape) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    writeln!(file, "# This file was produced by the NASA Exoplanet Archive").unwrap();
    writeln!(file, "# synthetic test catalog").unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for line in catalog_rows(shape) {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Write raw CSV text to a temporary file
pub fn write_raw(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
