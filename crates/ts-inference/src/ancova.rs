//! Covariate-adjusted linear models (ANCOVA) and the type-III group test.
//!
//! A [`ModelSpec`] names the terms of `outcome ~ group + pretest + covariates`
//! without any string parsing. [`fit_group_term`] builds the treatment-coded
//! design matrix on the rows where every model variable is present, fits it
//! by least squares (SVD), and tests the group term with an F-test of the
//! full model against the model without the group columns. With no
//! interaction terms this is the type-III test and does not depend on term
//! order.

use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use thiserror::Error;
use ts_core::{CleanDataset, CorrectionSet, GroupEffect};

/// Why a model could not be fitted on its filtered rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitFailure {
    /// A model variable is not in the dataset.
    #[error("column '{0}' is not available")]
    MissingColumn(String),
    /// Every row misses at least one model variable.
    #[error("no complete rows remain after dropping rows with missing {0}")]
    NoCompleteRows(String),
    /// The group term has a single level among complete rows.
    #[error("group has {0} level(s) among complete rows; at least 2 are required")]
    SingleGroupLevel(usize),
    /// As many parameters as rows.
    #[error("{n_obs} complete row(s) cannot support {n_params} model parameters")]
    NoResidualDf {
        /// Complete rows.
        n_obs: usize,
        /// Design columns.
        n_params: usize,
    },
    /// Collinear design columns.
    #[error("design matrix is rank deficient (rank {rank} of {n_params}); model terms are collinear")]
    RankDeficient {
        /// Numerical rank.
        rank: usize,
        /// Design columns.
        n_params: usize,
    },
    /// The outcome is reproduced exactly.
    #[error("residual variance is zero; the outcome is fitted exactly")]
    ZeroResidual,
    /// Linear algebra failure.
    #[error("least-squares solve failed: {0}")]
    Solve(String),
}

impl FitFailure {
    /// Suggested fix for the failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            FitFailure::MissingColumn(_) => "use the provided template",
            FitFailure::NoCompleteRows(_) | FitFailure::NoResidualDf { .. } => {
                "enter the outcome and pre-test values for more subjects"
            }
            FitFailure::SingleGroupLevel(_) => {
                "make sure subjects from both groups have outcome and pre-test values"
            }
            FitFailure::RankDeficient { .. } => {
                "check the baseline covariates for levels that coincide with a group or another covariate"
            }
            FitFailure::ZeroResidual => "check the outcome column for copied or constant values",
            FitFailure::Solve(_) => "check the numeric columns for extreme values",
        }
    }
}

/// Typed model relation: `outcome ~ group + pretest + numeric + C(categorical)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    outcome: String,
    group: String,
    pretest: String,
    numeric_covariates: Vec<String>,
    categorical_covariates: Vec<String>,
}

impl ModelSpec {
    /// Base relation `outcome ~ group + pretest`.
    pub fn new(outcome: &str, group: &str, pretest: &str) -> Self {
        Self {
            outcome: outcome.to_string(),
            group: group.to_string(),
            pretest: pretest.to_string(),
            numeric_covariates: Vec::new(),
            categorical_covariates: Vec::new(),
        }
    }

    /// Add a linear term. A term already in the relation is not repeated.
    pub fn with_numeric_covariate(mut self, name: &str) -> Self {
        if name != self.pretest && !self.numeric_covariates.iter().any(|c| c == name) {
            self.numeric_covariates.push(name.to_string());
        }
        self
    }

    /// Add a factor term. A term already in the relation is not repeated.
    pub fn with_categorical_covariate(mut self, name: &str) -> Self {
        if name != self.group && !self.categorical_covariates.iter().any(|c| c == name) {
            self.categorical_covariates.push(name.to_string());
        }
        self
    }

    /// Append every term of a correction set, in order.
    pub fn with_corrections(self, correction: &CorrectionSet) -> Self {
        let spec = correction.numeric_terms().fold(self, |s, t| s.with_numeric_covariate(&t.variable));
        correction.categorical_terms().fold(spec, |s, t| s.with_categorical_covariate(&t.variable))
    }

    /// Outcome column.
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// Rendered relation, e.g. `y ~ group + pre + age + C(education)`.
    pub fn formula(&self) -> String {
        let mut f = format!("{} ~ {} + {}", self.outcome, self.group, self.pretest);
        for c in &self.numeric_covariates {
            f.push_str(" + ");
            f.push_str(c);
        }
        for c in &self.categorical_covariates {
            f.push_str(&format!(" + C({c})"));
        }
        f
    }

    /// Every column the relation reads.
    pub fn variables(&self) -> Vec<&str> {
        let mut v = vec![self.outcome.as_str(), self.group.as_str(), self.pretest.as_str()];
        v.extend(self.numeric_covariates.iter().map(String::as_str));
        v.extend(self.categorical_covariates.iter().map(String::as_str));
        v
    }
}

/// Type-III F-test of the group term.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTermTest {
    /// Complete rows used.
    pub n_obs: usize,
    /// F statistic.
    pub f_statistic: f64,
    /// Numerator degrees of freedom.
    pub df_num: usize,
    /// Residual degrees of freedom.
    pub df_den: usize,
    /// Upper-tail p-value.
    pub p_value: f64,
    /// Reference group level.
    pub reference_level: String,
    /// Adjusted effect of each other level against the reference.
    pub effects: Vec<GroupEffect>,
    /// Residual sum of squares of the full model.
    pub sse_full: f64,
    /// Residual sum of squares without the group term.
    pub sse_reduced: f64,
}

fn numeric_column<'a>(data: &'a CleanDataset, name: &str) -> Result<&'a [Option<f64>], FitFailure> {
    data.numeric(name).ok_or_else(|| FitFailure::MissingColumn(name.to_string()))
}

fn label_column<'a>(data: &'a CleanDataset, name: &str) -> Result<&'a [Option<String>], FitFailure> {
    data.categorical(name).ok_or_else(|| FitFailure::MissingColumn(name.to_string()))
}

/// Sorted distinct levels of `col` over `rows`.
fn levels(col: &[Option<String>], rows: &[usize]) -> Vec<String> {
    rows.iter()
        .filter_map(|&i| col[i].as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Least-squares fit; returns coefficients and residual sum of squares.
fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<(DVector<f64>, f64, usize), FitFailure> {
    let (n, p) = x.shape();
    let svd = x.clone().svd(true, true);
    let smax = svd.singular_values.max();
    let tol = (n.max(p) as f64) * f64::EPSILON * smax;
    let rank = svd.singular_values.iter().filter(|&&s| s > tol).count();
    let beta = svd.solve(y, tol).map_err(|e| FitFailure::Solve(e.to_string()))?;
    let resid = y - x * &beta;
    Ok((beta, resid.norm_squared(), rank))
}

/// Fit `spec` on the complete rows of `data` and test the group term.
pub fn fit_group_term(spec: &ModelSpec, data: &CleanDataset) -> Result<GroupTermTest, FitFailure> {
    let y_col = numeric_column(data, &spec.outcome)?;
    let g_col = label_column(data, &spec.group)?;
    let pre_col = numeric_column(data, &spec.pretest)?;
    let num_cols = spec
        .numeric_covariates
        .iter()
        .map(|c| numeric_column(data, c))
        .collect::<Result<Vec<_>, _>>()?;
    let cat_cols = spec
        .categorical_covariates
        .iter()
        .map(|c| label_column(data, c))
        .collect::<Result<Vec<_>, _>>()?;

    let rows: Vec<usize> = (0..data.n_rows())
        .filter(|&i| {
            y_col[i].is_some()
                && g_col[i].is_some()
                && pre_col[i].is_some()
                && num_cols.iter().all(|c| c[i].is_some())
                && cat_cols.iter().all(|c| c[i].is_some())
        })
        .collect();
    if rows.is_empty() {
        return Err(FitFailure::NoCompleteRows(spec.variables().join(", ")));
    }

    let group_levels = levels(g_col, &rows);
    if group_levels.len() < 2 {
        return Err(FitFailure::SingleGroupLevel(group_levels.len()));
    }
    let cat_levels: Vec<Vec<String>> = cat_cols.iter().map(|c| levels(c, &rows)).collect();

    let n = rows.len();
    let k_group = group_levels.len() - 1;
    let k_cat: usize = cat_levels.iter().map(|l| l.len().saturating_sub(1)).sum();
    let p = 1 + k_group + 1 + num_cols.len() + k_cat;
    if n <= p {
        return Err(FitFailure::NoResidualDf { n_obs: n, n_params: p });
    }

    // Columns: intercept | group dummies | pretest | numeric covariates | factor dummies.
    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = DVector::<f64>::zeros(n);
    for (r, &i) in rows.iter().enumerate() {
        y[r] = y_col[i].unwrap_or_default();
        x[(r, 0)] = 1.0;
        let g = g_col[i].as_deref().unwrap_or_default();
        if let Some(pos) = group_levels.iter().skip(1).position(|l| l == g) {
            x[(r, 1 + pos)] = 1.0;
        }
        let mut j = 1 + k_group;
        x[(r, j)] = pre_col[i].unwrap_or_default();
        j += 1;
        for c in &num_cols {
            x[(r, j)] = c[i].unwrap_or_default();
            j += 1;
        }
        for (c, lv) in cat_cols.iter().zip(&cat_levels) {
            let v = c[i].as_deref().unwrap_or_default();
            if let Some(pos) = lv.iter().skip(1).position(|l| l == v) {
                x[(r, j + pos)] = 1.0;
            }
            j += lv.len().saturating_sub(1);
        }
    }

    let (beta, sse_full, rank) = least_squares(&x, &y)?;
    if rank < p {
        return Err(FitFailure::RankDeficient { rank, n_params: p });
    }
    let mean = y.mean();
    let tss: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    if sse_full <= 1e-12 * tss || sse_full == 0.0 {
        return Err(FitFailure::ZeroResidual);
    }

    let x_reduced = x.clone().remove_columns(1, k_group);
    let (_, sse_reduced, _) = least_squares(&x_reduced, &y)?;

    let df_num = k_group;
    let df_den = n - p;
    let ss_group = (sse_reduced - sse_full).max(0.0);
    let f_statistic = (ss_group / df_num as f64) / (sse_full / df_den as f64);
    let dist = FisherSnedecor::new(df_num as f64, df_den as f64)
        .map_err(|e| FitFailure::Solve(e.to_string()))?;
    let p_value = dist.sf(f_statistic).clamp(0.0, 1.0);

    let effects = group_levels
        .iter()
        .skip(1)
        .enumerate()
        .map(|(k, level)| GroupEffect { level: level.clone(), estimate: beta[1 + k] })
        .collect();

    log::debug!(
        "{}: n={} F({},{})={:.4} p={:.6}",
        spec.formula(),
        n,
        df_num,
        df_den,
        f_statistic,
        p_value
    );

    Ok(GroupTermTest {
        n_obs: n,
        f_statistic,
        df_num,
        df_den,
        p_value,
        reference_level: group_levels[0].clone(),
        effects,
        sse_full,
        sse_reduced,
    })
}
