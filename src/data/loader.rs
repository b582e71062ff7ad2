//! CSV reader for KOI catalog exports

use super::table::{Column, KoiTable};
use crate::error::{ExoplanetError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

/// Tokens treated as missing values in numeric columns
const MISSING_TOKENS: [&str; 7] = ["", "nan", "NaN", "NAN", "NA", "null", "--"];

/// Input table format
#[derive(Debug, Clone)]
pub struct CsvFormat {
    /// Field delimiter
    pub delimiter: u8,
    /// Lines starting with this byte are skipped
    pub comment: Option<u8>,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            comment: Some(b'#'),
        }
    }
}

/// Reads an allow-listed subset of columns from a delimited file
pub struct CsvTableReader {
    format: CsvFormat,
}

impl CsvTableReader {
    /// Create new CSV reader with default format
    pub fn new() -> Self {
        Self {
            format: CsvFormat::default(),
        }
    }

    /// Create with custom format
    pub fn with_format(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Normalize a header name: trimmed and lower-cased
    pub fn normalize_header(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Load the columns named in `wanted` that exist in the file.
    ///
    /// Columns listed in `text_columns` are kept as strings; all others must
    /// parse as numbers or be a recognized missing token.
    pub fn load(&self, path: &Path, wanted: &[&str], text_columns: &[&str]) -> Result<KoiTable> {
        let load_err = |message: String| ExoplanetError::Load {
            path: path.to_path_buf(),
            message,
        };

        let mut rdr = ReaderBuilder::new()
            .delimiter(self.format.delimiter)
            .comment(self.format.comment)
            .trim(Trim::All)
            .has_headers(true)
            .from_path(path)
            .map_err(|e| load_err(format!("Failed to open CSV: {}", e)))?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| load_err(format!("Failed to read headers: {}", e)))?
            .iter()
            .map(Self::normalize_header)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(load_err("File has no header row".to_string()));
        }

        // Allow-list order, restricted to what the file provides
        let selected: Vec<(&str, usize)> = wanted
            .iter()
            .filter_map(|&name| Self::find_column(&headers, name).map(|idx| (name, idx)))
            .collect();

        let mut text_values: Vec<Vec<Option<String>>> = vec![Vec::new(); selected.len()];
        let mut numeric_values: Vec<Vec<Option<f64>>> = vec![Vec::new(); selected.len()];

        let mut record = StringRecord::new();
        let mut row = 0usize;
        while rdr
            .read_record(&mut record)
            .map_err(|e| load_err(format!("Failed to read record {}: {}", row + 1, e)))?
        {
            for (slot, &(name, idx)) in selected.iter().enumerate() {
                let raw = record.get(idx).unwrap_or("");
                if text_columns.contains(&name) {
                    text_values[slot].push(Self::parse_text(raw));
                } else {
                    let value = Self::parse_numeric(raw).map_err(|_| {
                        load_err(format!(
                            "Invalid numeric value '{}' in column '{}' at row {}",
                            raw,
                            name,
                            row + 1
                        ))
                    })?;
                    numeric_values[slot].push(value);
                }
            }
            row += 1;
        }

        let columns = selected
            .iter()
            .enumerate()
            .map(|(slot, &(name, _))| {
                if text_columns.contains(&name) {
                    Column::text(name, std::mem::take(&mut text_values[slot]))
                } else {
                    Column::numeric(name, std::mem::take(&mut numeric_values[slot]))
                }
            })
            .collect();

        KoiTable::from_columns(columns)
    }

    fn find_column(headers: &[String], name: &str) -> Option<usize> {
        headers.iter().position(|h| h == name)
    }

    fn parse_text(raw: &str) -> Option<String> {
        if MISSING_TOKENS.contains(&raw) {
            None
        } else {
            Some(raw.to_string())
        }
    }

    fn parse_numeric(raw: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
        if MISSING_TOKENS.contains(&raw) {
            return Ok(None);
        }
        let value: f64 = raw.parse()?;
        Ok(if value.is_nan() { None } else { Some(value) })
    }
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_selects_and_normalizes() {
        let file = write_csv(
            "# NASA exoplanet archive export\n\
             # another comment\n\
             KepID , KOI_Disposition,koi_period,unused\n\
             10797460,CONFIRMED,9.48,x\n\
             10811496,FALSE POSITIVE,,y\n",
        );

        let reader = CsvTableReader::new();
        let table = reader
            .load(
                file.path(),
                &["kepid", "koi_disposition", "koi_period", "koi_depth"],
                &["kepid", "koi_disposition"],
            )
            .unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.column_names(),
            vec!["kepid", "koi_disposition", "koi_period"]
        );
        assert_eq!(table.numeric("koi_period").unwrap(), &[Some(9.48), None]);
        assert_eq!(
            table.text("koi_disposition").unwrap()[1].as_deref(),
            Some("FALSE POSITIVE")
        );
    }

    #[test]
    fn test_missing_tokens() {
        assert_eq!(CsvTableReader::parse_numeric("").unwrap(), None);
        assert_eq!(CsvTableReader::parse_numeric("NaN").unwrap(), None);
        assert_eq!(CsvTableReader::parse_numeric("--").unwrap(), None);
        assert_eq!(CsvTableReader::parse_numeric("1e3").unwrap(), Some(1000.0));
        assert!(CsvTableReader::parse_numeric("abc").is_err());
    }

    #[test]
    fn test_invalid_numeric_is_load_error() {
        let file = write_csv("kepid,koi_period\n1,not-a-number\n");
        let reader = CsvTableReader::new();
        let err = reader
            .load(file.path(), &["kepid", "koi_period"], &["kepid"])
            .unwrap_err();
        match err {
            ExoplanetError::Load { message, .. } => {
                assert!(message.contains("koi_period"));
                assert!(message.contains("row 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let reader = CsvTableReader::new();
        let result = reader.load(Path::new("/definitely/not/here.csv"), &["kepid"], &[]);
        assert!(matches!(result, Err(ExoplanetError::Load { .. })));
    }

    #[test]
    fn test_custom_delimiter() {
        let file = write_csv("kepid;koi_period\n1;2.5\n");
        let reader = CsvTableReader::with_format(CsvFormat {
            delimiter: b';',
            comment: None,
        });
        let table = reader
            .load(file.path(), &["kepid", "koi_period"], &["kepid"])
            .unwrap();
        assert_eq!(table.numeric("koi_period").unwrap(), &[Some(2.5)]);
    }
}
