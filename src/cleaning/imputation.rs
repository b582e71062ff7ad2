//! Median imputation of missing numeric values

use crate::data::{Column, ColumnData, KoiTable};
use crate::error::Result;
use statrs::statistics::{Data, Median};

/// Median of the non-missing values, `None` when every value is missing
pub fn column_median(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| !v.is_nan())
        .collect();
    if present.is_empty() {
        return None;
    }
    Some(Data::new(present).median())
}

/// Fill missing cells of a column with its own median
pub fn impute_with_median(values: &[Option<f64>]) -> Vec<Option<f64>> {
    match column_median(values) {
        Some(median) => values
            .iter()
            .map(|v| match v {
                Some(x) if !x.is_nan() => Some(*x),
                _ => Some(median),
            })
            .collect(),
        None => values.to_vec(),
    }
}

/// Outcome of the imputation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ImputationReport {
    /// Columns that had at least one value filled
    pub imputed_columns: Vec<String>,
    /// Rows still incomplete after imputation and therefore dropped
    pub residual_rows_dropped: usize,
}

/// Impute every numeric column not listed in `excluded`, then drop any row
/// that still has a missing cell.
pub fn impute_table(table: &KoiTable, excluded: &[&str]) -> Result<(KoiTable, ImputationReport)> {
    let mut imputed = KoiTable::new();
    let mut imputed_columns = Vec::new();

    for column in table.columns() {
        let next = match &column.data {
            ColumnData::Numeric(values)
                if !excluded.contains(&column.name.as_str())
                    && column.data.missing_count() > 0 =>
            {
                imputed_columns.push(column.name.clone());
                Column::numeric(column.name.clone(), impute_with_median(values))
            }
            _ => column.clone(),
        };
        imputed.set_column(next)?;
    }

    let keep: Vec<bool> = (0..imputed.n_rows())
        .map(|row| !imputed.row_has_missing(row))
        .collect();
    let complete = imputed.filter_rows(&keep)?;

    let report = ImputationReport {
        imputed_columns,
        residual_rows_dropped: table.n_rows() - complete.n_rows(),
    };
    Ok((complete, report))
}
