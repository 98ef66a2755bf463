//! Per-group box summaries with all points.

use serde::Serialize;
use ts_core::schema;
use ts_core::{CleanDataset, Error, Result};

use crate::groups::{rows_by_group, values_at};

/// Per-group box summaries of one numeric variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Column name.
    pub variable: String,
    /// Display title.
    pub title: String,
    /// One summary per group with data, labels sorted.
    pub groups: Vec<BoxGroup>,
}

/// Five-number summary of one group plus Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    /// Group label.
    pub group: String,
    /// Non-missing observations.
    pub n: usize,
    /// Smallest value.
    pub min: f64,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Largest value.
    pub max: f64,
    /// Sample mean.
    pub mean: f64,
    /// Most extreme point within `q1 - 1.5 IQR`.
    pub lower_whisker: f64,
    /// Most extreme point within `q3 + 1.5 IQR`.
    pub upper_whisker: f64,
    /// Points beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
    /// Every point, in row order.
    pub points: Vec<f64>,
}

/// Linear-interpolation quantile of sorted data.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn summarize(group: String, points: Vec<f64>) -> BoxGroup {
    let mut sorted = points.clone();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    BoxGroup {
        group,
        n: sorted.len(),
        min: sorted[0],
        q1,
        median: quantile_sorted(&sorted, 0.5),
        q3,
        max: sorted[sorted.len() - 1],
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        lower_whisker,
        upper_whisker,
        outliers: sorted.iter().copied().filter(|v| *v < lo_fence || *v > hi_fence).collect(),
        points,
    }
}

/// Box summary of `variable` for every observed group with at least one value.
pub fn box_artifact(data: &CleanDataset, variable: &str) -> Result<BoxArtifact> {
    let column = data.require_numeric(variable)?;
    let groups: Vec<BoxGroup> = rows_by_group(data)?
        .into_iter()
        .filter_map(|(g, rows)| {
            let points = values_at(column, &rows);
            (!points.is_empty()).then(|| summarize(g, points))
        })
        .collect();
    if groups.is_empty() {
        return Err(Error::Validation(format!("'{variable}' has no values in any group")));
    }
    Ok(BoxArtifact {
        schema_version: "trialstat_box_v0".to_string(),
        variable: variable.to_string(),
        title: format!(
            "{} by group",
            schema::variable(variable).map_or(variable, |v| v.display_name)
        ),
        groups,
    })
}
