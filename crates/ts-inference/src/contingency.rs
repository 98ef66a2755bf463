use std::collections::BTreeMap;

use statrs::distribution::{ChiSquared, ContinuousCDF};
use ts_core::{Error, Result};

/// Cross-tabulation of two categorical variables.
///
/// Only observed levels appear; rows and columns are sorted lexicographically.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    /// Row labels (first variable).
    pub row_labels: Vec<String>,
    /// Column labels (second variable).
    pub col_labels: Vec<String>,
    /// Counts, `counts[row][col]`.
    pub counts: Vec<Vec<f64>>,
}

impl ContingencyTable {
    /// Tabulate complete `(row, col)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cells: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        let mut rows: BTreeMap<&str, usize> = BTreeMap::new();
        let mut cols: BTreeMap<&str, usize> = BTreeMap::new();
        for (r, c) in pairs {
            *cells.entry((r, c)).or_insert(0.0) += 1.0;
            rows.insert(r, 0);
            cols.insert(c, 0);
        }
        for (i, v) in rows.values_mut().enumerate() {
            *v = i;
        }
        for (j, v) in cols.values_mut().enumerate() {
            *v = j;
        }
        let mut counts = vec![vec![0.0; cols.len()]; rows.len()];
        for ((r, c), n) in cells {
            counts[rows[r]][cols[c]] = n;
        }
        Self {
            row_labels: rows.keys().map(|s| s.to_string()).collect(),
            col_labels: cols.keys().map(|s| s.to_string()).collect(),
            counts,
        }
    }

    /// Total count.
    pub fn total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }
}

/// Result of a Pearson chi-square test of independence.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareTest {
    /// Test statistic.
    pub statistic: f64,
    /// Degrees of freedom `(r - 1)(c - 1)`.
    pub dof: usize,
    /// Upper-tail p-value.
    pub p_value: f64,
    /// Whether the Yates continuity correction was applied (only when `dof == 1`).
    pub yates: bool,
    /// Expected counts under independence.
    pub expected: Vec<Vec<f64>>,
}

/// Pearson chi-square test of independence.
///
/// Applies the Yates continuity correction when `dof == 1`. A table with a
/// single row or column has `dof == 0` and yields `statistic = 0`, `p = 1`.
pub fn chi2_independence(table: &ContingencyTable) -> Result<ChiSquareTest> {
    let total = table.total();
    if total <= 0.0 {
        return Err(Error::Validation(
            "contingency table is empty (no rows with both values present)".to_string(),
        ));
    }
    let r = table.row_labels.len();
    let c = table.col_labels.len();
    let row_sums: Vec<f64> = table.counts.iter().map(|row| row.iter().sum()).collect();
    let col_sums: Vec<f64> =
        (0..c).map(|j| table.counts.iter().map(|row| row[j]).sum()).collect();

    let expected: Vec<Vec<f64>> = row_sums
        .iter()
        .map(|&rs| col_sums.iter().map(|&cs| rs * cs / total).collect())
        .collect();

    let dof = (r - 1) * (c - 1);
    if dof == 0 {
        return Ok(ChiSquareTest { statistic: 0.0, dof, p_value: 1.0, yates: false, expected });
    }

    let yates = dof == 1;
    let mut statistic = 0.0;
    for i in 0..r {
        for j in 0..c {
            let e = expected[i][j];
            let mut o = table.counts[i][j];
            if yates {
                let diff = e - o;
                o += diff.signum() * diff.abs().min(0.5);
            }
            statistic += (o - e) * (o - e) / e;
        }
    }

    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| Error::Validation(format!("invalid chi-square distribution: {e}")))?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);

    Ok(ChiSquareTest { statistic, dof, p_value, yates, expected })
}
