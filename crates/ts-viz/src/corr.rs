//! Correlation heatmap artifact (numbers-first).

use serde::Serialize;
use ts_core::schema::{self, VariableKind};
use ts_core::{CleanDataset, Error, Result};

/// Pairwise-complete Pearson correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Display title.
    pub title: String,
    /// Column names, in matrix order.
    pub variables: Vec<String>,
    /// Display names aligned with `variables`.
    pub display_names: Vec<String>,
    /// Pearson `r`; `None` where fewer than two complete pairs exist or a column is constant.
    pub corr: Vec<Vec<Option<f64>>>,
    /// Complete pairs behind each entry.
    pub n_pairs: Vec<Vec<usize>>,
}

/// Pearson correlation over the rows where both values are present.
pub fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>]) -> (Option<f64>, usize) {
    let pairs: Vec<(f64, f64)> =
        x.iter().zip(y).filter_map(|(a, b)| Some(((*a)?, (*b)?))).collect();
    let n = pairs.len();
    if n < 2 {
        return (None, n);
    }
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
        syy += (b - my) * (b - my);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return (None, n);
    }
    (Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)), n)
}

/// Correlation matrix over every numeric study variable, in schema order.
pub fn corr_artifact(data: &CleanDataset) -> Result<CorrArtifact> {
    let specs: Vec<_> = schema::variables_of_kind(VariableKind::Numeric).collect();
    let columns = specs
        .iter()
        .map(|s| data.require_numeric(s.name))
        .collect::<Result<Vec<_>>>()?;

    let k = columns.len();
    let mut corr = vec![vec![None; k]; k];
    let mut n_pairs = vec![vec![0usize; k]; k];
    for i in 0..k {
        for j in i..k {
            let (r, n) = pairwise_pearson(columns[i], columns[j]);
            corr[i][j] = r;
            corr[j][i] = r;
            n_pairs[i][j] = n;
            n_pairs[j][i] = n;
        }
    }
    if corr.iter().flatten().all(Option::is_none) {
        return Err(Error::Validation(
            "no pair of numeric variables has two complete, non-constant observations".to_string(),
        ));
    }

    Ok(CorrArtifact {
        schema_version: "trialstat_corr_v0".to_string(),
        title: "Correlation of numeric variables".to_string(),
        variables: specs.iter().map(|s| s.name.to_string()).collect(),
        display_names: specs.iter().map(|s| s.display_name.to_string()).collect(),
        corr,
        n_pairs,
    })
}
