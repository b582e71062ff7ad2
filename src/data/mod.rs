//! Tabular catalog data: in-memory table and CSV loading

pub mod loader;
pub mod table;

pub use loader::{CsvFormat, CsvTableReader};
pub use table::{Column, ColumnData, KoiTable};
