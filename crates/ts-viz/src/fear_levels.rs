//! Stacked percentages of low / moderate / high VAS fear per group and time.

use serde::Serialize;
use ts_core::{CleanDataset, Error, Result};

use crate::evolution::FEAR_VAS_TIMES;
use crate::groups::{rows_by_group, values_at};

/// Fear level bands as half-open `[lo, hi)` intervals.
pub const FEAR_LEVELS: [(&str, f64, f64); 3] =
    [("Low (0-3)", 0.0, 4.0), ("Moderate (4-6)", 4.0, 7.0), ("High (7-10)", 7.0, 10.1)];

/// Low / moderate / high fear shares per group and time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FearLevelArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Display title.
    pub title: String,
    /// Band labels.
    pub levels: Vec<String>,
    /// Time labels.
    pub times: Vec<String>,
    /// One facet per observed group.
    pub panels: Vec<FearLevelPanel>,
}

/// One group facet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FearLevelPanel {
    /// Group label.
    pub group: String,
    /// Banded observations per time.
    pub n: Vec<usize>,
    /// `percent[time][level]`; each row sums to 100 unless empty.
    pub percent: Vec<Vec<f64>>,
}

/// Band of a VAS value; `None` outside `[0, 10.1)`.
pub fn fear_level(v: f64) -> Option<usize> {
    FEAR_LEVELS.iter().position(|&(_, lo, hi)| v >= lo && v < hi)
}

/// Per-group, per-time shares of each fear band.
pub fn fear_level_artifact(data: &CleanDataset) -> Result<FearLevelArtifact> {
    let columns = FEAR_VAS_TIMES
        .iter()
        .map(|(_, col)| data.require_numeric(col))
        .collect::<Result<Vec<_>>>()?;

    let panels: Vec<FearLevelPanel> = rows_by_group(data)?
        .into_iter()
        .map(|(group, rows)| {
            let (n, percent) = columns
                .iter()
                .map(|col| {
                    let mut counts = [0usize; 3];
                    for k in values_at(col, &rows).into_iter().filter_map(fear_level) {
                        counts[k] += 1;
                    }
                    let total: usize = counts.iter().sum();
                    let pct: Vec<f64> = counts
                        .iter()
                        .map(|&c| if total > 0 { 100.0 * c as f64 / total as f64 } else { 0.0 })
                        .collect();
                    (total, pct)
                })
                .unzip();
            FearLevelPanel { group, n, percent }
        })
        .collect();
    if panels.iter().all(|p| p.n.iter().all(|&n| n == 0)) {
        return Err(Error::Validation("no VAS fear value falls in the 0-10 range".to_string()));
    }

    Ok(FearLevelArtifact {
        schema_version: "trialstat_fear_levels_v0".to_string(),
        title: "VAS fear levels over time".to_string(),
        levels: FEAR_LEVELS.iter().map(|(l, _, _)| l.to_string()).collect(),
        times: FEAR_VAS_TIMES.iter().map(|(t, _)| t.to_string()).collect(),
        panels,
    })
}
