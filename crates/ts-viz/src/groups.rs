use std::collections::BTreeMap;

use ts_core::schema::GROUP_COLUMN;
use ts_core::{CleanDataset, Result};

/// Row indices per observed group label, labels sorted. Rows without a label are skipped.
pub(crate) fn rows_by_group(data: &CleanDataset) -> Result<Vec<(String, Vec<usize>)>> {
    let groups = data.require_categorical(GROUP_COLUMN)?;
    let mut out: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, g) in groups.iter().enumerate() {
        if let Some(g) = g.as_deref() {
            out.entry(g).or_default().push(i);
        }
    }
    Ok(out.into_iter().map(|(g, rows)| (g.to_string(), rows)).collect())
}

/// Non-missing values of `column` at `rows`.
pub(crate) fn values_at(column: &[Option<f64>], rows: &[usize]) -> Vec<f64> {
    rows.iter().filter_map(|&i| column[i]).collect()
}
