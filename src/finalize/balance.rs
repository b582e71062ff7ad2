//! Class balancing by random oversampling

use crate::data::KoiTable;
use crate::error::{ExoplanetError, Result};
use crate::types::Label;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Row indices per label, classes in order of first appearance
pub fn class_indices(labels: &[Label]) -> Vec<(Label, Vec<usize>)> {
    let mut classes: Vec<(Label, Vec<usize>)> = Vec::new();
    for (row, &label) in labels.iter().enumerate() {
        match classes.iter_mut().find(|(l, _)| *l == label) {
            Some((_, rows)) => rows.push(row),
            None => classes.push((label, vec![row])),
        }
    }
    classes
}

/// Row order of the balanced dataset.
///
/// The minority class is drawn with replacement up to the majority count,
/// every other class is permuted without replacement, and the concatenation
/// is shuffled once more. Ties for minority go to the first class seen.
pub fn balanced_order(labels: &[Label], seed: u64) -> Vec<usize> {
    let classes = class_indices(labels);
    let majority_count = classes.iter().map(|(_, rows)| rows.len()).max().unwrap_or(0);
    let minority = classes
        .iter()
        .min_by_key(|(_, rows)| rows.len())
        .map(|(label, _)| *label);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut order = Vec::with_capacity(majority_count * classes.len());

    for (label, rows) in &classes {
        if Some(*label) == minority {
            order.extend((0..majority_count).map(|_| rows[rng.gen_range(0..rows.len())]));
        } else {
            let mut permuted = rows.clone();
            permuted.shuffle(&mut rng);
            order.extend(permuted);
        }
    }

    order.shuffle(&mut rng);
    order
}

/// Oversample the minority class to the majority count and shuffle.
///
/// Fails when fewer than two distinct labels are present.
pub fn balance_classes(features: &KoiTable, labels: &[Label], seed: u64) -> Result<(KoiTable, Vec<Label>)> {
    if features.n_rows() != labels.len() {
        return Err(ExoplanetError::ShapeError {
            expected: format!("{} labels", features.n_rows()),
            actual: format!("{} labels", labels.len()),
        });
    }

    let order = balanced_order(labels, seed);
    let balanced_labels: Vec<Label> = order.iter().map(|&row| labels[row]).collect();

    let classes = class_indices(&balanced_labels);
    if classes.len() < 2 {
        return Err(ExoplanetError::Validation(format!(
            "balancing needs at least two classes, found {}",
            classes.len()
        )));
    }

    let mut distribution: Vec<(Label, usize)> =
        classes.iter().map(|(label, rows)| (*label, rows.len())).collect();
    distribution.sort_unstable();
    log::info!("Final class distribution: {:?}", distribution);

    Ok((features.take_rows(&order)?, balanced_labels))
}
