//! Raw and cleaned dataset containers.
//!
//! [`Dataset`] holds the uploaded table verbatim (strings, header order kept).
//! [`CleanDataset`] holds the typed columns produced by validation; it is
//! immutable once built.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::schema;
use crate::{Error, Result};

/// Uploaded table, one string cell per (row, column).
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build from headers and row-major cells. Every row must have one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(Error::Validation(format!(
                    "row {} has {} cells, expected {}",
                    i + 1,
                    row.len(),
                    headers.len()
                )));
            }
        }
        Ok(Self { headers, rows })
    }

    /// Build from named columns of equal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<String>)>) -> Result<Self> {
        let n = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut headers = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        for (name, col) in columns {
            let name = name.into();
            if col.len() != n {
                return Err(Error::Validation(format!(
                    "column '{}' has {} values, expected {}",
                    name,
                    col.len(),
                    n
                )));
            }
            headers.push(name);
            cols.push(col);
        }
        let mut rows: Vec<Vec<String>> = (0..n).map(|_| Vec::with_capacity(cols.len())).collect();
        for col in cols {
            for (row, cell) in rows.iter_mut().zip(col) {
                row.push(cell);
            }
        }
        Ok(Self { headers, rows })
    }

    /// Parse CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(Error::Validation("CSV input has no header row".to_string()));
        }
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }
        Self::new(headers, rows)
    }

    /// Parse CSV text.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes())
    }

    /// Parse a CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// Column names in upload order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether a column with this exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Cells of the first column named `name`.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let j = self.headers.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|r| r[j].as_str()).collect())
    }
}

/// Lenient numeric coercion: trimmed `f64`, anything else (including
/// non-finite values) is missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    let t = cell.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Categorical coercion: empty cells are missing, everything else is kept verbatim.
pub fn coerce_label(cell: &str) -> Option<String> {
    if cell.trim().is_empty() { None } else { Some(cell.to_string()) }
}

/// Typed columns of a validated dataset.
#[derive(Debug, Clone, Default)]
pub struct CleanDataset {
    n_rows: usize,
    numeric: BTreeMap<String, Vec<Option<f64>>>,
    categorical: BTreeMap<String, Vec<Option<String>>>,
}

impl CleanDataset {
    /// Empty dataset with a fixed row count.
    pub fn new(n_rows: usize) -> Self {
        Self { n_rows, ..Default::default() }
    }

    /// Add a numeric column.
    pub fn with_numeric(mut self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        self.check_len(name, values.len())?;
        self.numeric.insert(name.to_string(), values);
        Ok(self)
    }

    /// Add a categorical column.
    pub fn with_categorical(mut self, name: &str, values: Vec<Option<String>>) -> Result<Self> {
        self.check_len(name, values.len())?;
        self.categorical.insert(name.to_string(), values);
        Ok(self)
    }

    fn check_len(&self, name: &str, len: usize) -> Result<()> {
        if len != self.n_rows {
            return Err(Error::Validation(format!(
                "column '{}' has {} values, expected {}",
                name, len, self.n_rows
            )));
        }
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Numeric column by name.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.numeric.get(name).map(|v| v.as_slice())
    }

    /// Categorical column by name.
    pub fn categorical(&self, name: &str) -> Option<&[Option<String>]> {
        self.categorical.get(name).map(|v| v.as_slice())
    }

    /// Numeric column or a validation error naming it.
    pub fn require_numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        self.numeric(name)
            .ok_or_else(|| Error::Validation(format!("numeric column '{}' is not available", name)))
    }

    /// Categorical column or a validation error naming it.
    pub fn require_categorical(&self, name: &str) -> Result<&[Option<String>]> {
        self.categorical(name).ok_or_else(|| {
            Error::Validation(format!("categorical column '{}' is not available", name))
        })
    }
}

/// Empty CSV template: the required headers in schema order, no rows.
pub fn template_csv() -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(schema::required_columns())?;
    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Validation(format!("template is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_numeric_is_lenient() {
        assert_eq!(coerce_numeric(" 7.5 "), Some(7.5));
        assert_eq!(coerce_numeric("31"), Some(31.0));
        assert_eq!(coerce_numeric("7,0"), None);
        assert_eq!(coerce_numeric("unknown"), None);
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("inf"), None);
        assert_eq!(coerce_numeric("NaN"), None);
    }

    #[test]
    fn test_coerce_label_keeps_text() {
        assert_eq!(coerce_label("Primary"), Some("Primary".to_string()));
        assert_eq!(coerce_label("   "), None);
    }

    #[test]
    fn test_csv_round_trip_of_cells() {
        let ds = Dataset::from_csv_str("age,group\n31,Control\n,Intervention\n").unwrap();
        assert_eq!(ds.headers(), &["age".to_string(), "group".to_string()]);
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column("age").unwrap(), vec!["31", ""]);
        assert!(ds.column("missing").is_none());
    }

    #[test]
    fn test_ragged_csv_is_rejected() {
        let err = Dataset::from_csv_str("a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, Error::Csv(_)), "{err:?}");
    }

    #[test]
    fn test_from_columns_checks_lengths() {
        let ok = Dataset::from_columns(vec![
            ("a", vec!["1".to_string(), "2".to_string()]),
            ("b", vec!["x".to_string(), "y".to_string()]),
        ])
        .unwrap();
        assert_eq!(ok.column("b").unwrap(), vec!["x", "y"]);

        let bad = Dataset::from_columns(vec![
            ("a", vec!["1".to_string()]),
            ("b", vec!["x".to_string(), "y".to_string()]),
        ]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_template_has_all_required_headers() {
        let text = template_csv().unwrap();
        let ds = Dataset::from_csv_str(&text).unwrap();
        assert_eq!(ds.n_rows(), 0);
        let expected: Vec<String> = schema::required_columns().map(String::from).collect();
        assert_eq!(ds.headers(), expected.as_slice());
    }

    #[test]
    fn test_clean_dataset_length_check() {
        let clean = CleanDataset::new(2).with_numeric("age", vec![Some(1.0), None]).unwrap();
        assert_eq!(clean.numeric("age").unwrap().len(), 2);
        assert!(CleanDataset::new(2).with_categorical("group", vec![None]).is_err());
        assert!(clean.require_categorical("group").is_err());
    }
}
