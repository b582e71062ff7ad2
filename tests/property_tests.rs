//! Property tests for the finalization and cleaning invariants

use exoplanet_ml::cleaning::ScientificFilter;
use exoplanet_ml::config::default_domain_bounds;
use exoplanet_ml::data::{Column, KoiTable};
use exoplanet_ml::finalize::{balance_classes, create_temporal_splits, RobustScaler};
use exoplanet_ml::types::{DEPTH, DURATION, LABEL, PERIOD, SNR};
use ndarray::Array2;
use proptest::prelude::*;

proptest! {
    #[test]
    fn temporal_splits_chain_forward(n in 3usize..2000, k in 2usize..10) {
        prop_assume!(n >= k + 1);
        let folds = create_temporal_splits(n, k).unwrap();
        let test_size = n / (k + 1);

        prop_assert_eq!(folds.len(), k);
        for (i, fold) in folds.iter().enumerate() {
            prop_assert_eq!(fold.test_len(), test_size);
            // training rows are a prefix ending right before the test block
            prop_assert!(fold.train.iter().enumerate().all(|(pos, &row)| pos == row));
            prop_assert_eq!(fold.train_len(), fold.test[0]);
            prop_assert!(fold.test.windows(2).all(|w| w[1] == w[0] + 1));
            if i > 0 {
                prop_assert!(fold.train_len() > folds[i - 1].train_len());
            }
        }
        let last = folds.last().unwrap();
        prop_assert_eq!(*last.test.last().unwrap(), n - 1);
    }

    #[test]
    fn too_few_rows_for_folds_is_rejected(k in 2usize..20, short in 0usize..20) {
        prop_assume!(short < k + 1);
        prop_assert!(create_temporal_splits(short, k).is_err());
    }

    #[test]
    fn balancing_equalizes_binary_classes(
        labels in proptest::collection::vec(0u8..=1, 2..300),
        seed in any::<u64>(),
    ) {
        let ones = labels.iter().filter(|&&l| l == 1).count();
        prop_assume!(ones > 0 && ones < labels.len());
        let majority = ones.max(labels.len() - ones);

        let values: Vec<Option<f64>> = (0..labels.len()).map(|i| Some(i as f64)).collect();
        let table = KoiTable::from_columns(vec![Column::numeric("row", values)]).unwrap();
        let (balanced, out_labels) = balance_classes(&table, &labels, seed).unwrap();

        prop_assert_eq!(balanced.n_rows(), 2 * majority);
        prop_assert_eq!(out_labels.iter().filter(|&&l| l == 1).count(), majority);

        // every output row carries the label of the source row it came from
        let rows = balanced.numeric("row").unwrap();
        for (value, label) in rows.iter().zip(&out_labels) {
            let source = value.unwrap() as usize;
            prop_assert_eq!(labels[source], *label);
        }
    }

    #[test]
    fn filtered_rows_respect_bounds(
        rows in proptest::collection::vec(
            (
                prop_oneof![Just(None), (0.0f64..1500.0).prop_map(Some)],
                prop_oneof![Just(None), (0.0f64..60.0).prop_map(Some)],
                prop_oneof![Just(None), (0.0f64..120_000.0).prop_map(Some)],
                prop_oneof![Just(None), (0.0f64..1200.0).prop_map(Some)],
                prop_oneof![Just(None), Just(Some(0.0)), Just(Some(1.0))],
            ),
            1..200,
        )
    ) {
        let table = KoiTable::from_columns(vec![
            Column::numeric(LABEL, rows.iter().map(|r| r.4).collect()),
            Column::numeric(PERIOD, rows.iter().map(|r| r.0).collect()),
            Column::numeric(DURATION, rows.iter().map(|r| r.1).collect()),
            Column::numeric(DEPTH, rows.iter().map(|r| r.2).collect()),
            Column::numeric(SNR, rows.iter().map(|r| r.3).collect()),
        ])
        .unwrap();

        let bounds = default_domain_bounds();
        let (cleaned, report) = ScientificFilter::new(bounds.clone()).apply(&table).unwrap();

        prop_assert!(cleaned.n_rows() <= table.n_rows());
        prop_assert_eq!(report.rows_out, cleaned.n_rows());
        prop_assert!(cleaned.numeric(LABEL).unwrap().iter().all(|l| l.is_some()));
        for bound in &bounds {
            let column = cleaned.numeric(&bound.column).unwrap();
            prop_assert!(column.iter().all(|v| bound.contains(*v)));
        }
    }

    #[test]
    fn scaler_centers_medians_at_zero(
        values in proptest::collection::vec(-1e6f64..1e6, 5..100),
    ) {
        let x = Array2::from_shape_vec((values.len(), 1), values).unwrap();
        let (scaler, scaled) = RobustScaler::fit_transform(&x).unwrap();

        prop_assert!(scaler.scale()[0] > 0.0);
        prop_assert!(scaled.iter().all(|v| v.is_finite()));

        let mut sorted: Vec<f64> = scaled.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        prop_assert!(median.abs() < 1e-6);
    }
}
