#![allow(dead_code)]

use std::path::PathBuf;

use ts_core::Dataset;

pub fn repo_root() -> PathBuf {
    // crates/ts-inference -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

pub fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

pub fn load(name: &str) -> Dataset {
    let path = fixture_path(name);
    Dataset::from_csv_path(&path).unwrap_or_else(|e| panic!("load {}: {}", path.display(), e))
}

/// Rebuild `ds` with `column` rewritten cell by cell; `f` gets the row index and old cell.
pub fn map_column(ds: &Dataset, column: &str, f: impl Fn(usize, &str) -> String) -> Dataset {
    let cols: Vec<(String, Vec<String>)> = ds
        .headers()
        .iter()
        .map(|h| {
            let cells = ds.column(h).unwrap();
            let cells = if h == column {
                cells.iter().enumerate().map(|(i, c)| f(i, c)).collect()
            } else {
                cells.iter().map(|c| c.to_string()).collect()
            };
            (h.clone(), cells)
        })
        .collect();
    Dataset::from_columns(cols).unwrap()
}

/// Rebuild `ds` without `column`.
pub fn drop_column(ds: &Dataset, column: &str) -> Dataset {
    let cols: Vec<(String, Vec<String>)> = ds
        .headers()
        .iter()
        .filter(|h| *h != column)
        .map(|h| (h.clone(), ds.column(h).unwrap().iter().map(|c| c.to_string()).collect()))
        .collect();
    Dataset::from_columns(cols).unwrap()
}
