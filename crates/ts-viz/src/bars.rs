//! Grouped bar artifact: level counts of a categorical variable per group.

use std::collections::BTreeSet;

use serde::Serialize;
use ts_core::schema;
use ts_core::{CleanDataset, Error, Result};

use crate::groups::rows_by_group;

/// Level counts of a categorical variable, one series per group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Column name.
    pub variable: String,
    /// Display title.
    pub title: String,
    /// Category axis, sorted.
    pub levels: Vec<String>,
    /// One series per observed group, labels sorted.
    pub series: Vec<BarSeries>,
}

/// Counts of one group, aligned with `levels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// Group label.
    pub group: String,
    /// Count per level.
    pub counts: Vec<usize>,
}

/// Count each level of `variable` within each observed group.
pub fn grouped_bar_artifact(data: &CleanDataset, variable: &str) -> Result<GroupedBarArtifact> {
    let column = data.require_categorical(variable)?;
    let groups = rows_by_group(data)?;

    let levels: Vec<String> = groups
        .iter()
        .flat_map(|(_, rows)| rows.iter().filter_map(|&i| column[i].as_deref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();
    if levels.is_empty() {
        return Err(Error::Validation(format!("'{variable}' has no values in any group")));
    }

    let series = groups
        .into_iter()
        .map(|(group, rows)| {
            let mut counts = vec![0usize; levels.len()];
            for v in rows.iter().filter_map(|&i| column[i].as_deref()) {
                if let Ok(k) = levels.binary_search_by(|l| l.as_str().cmp(v)) {
                    counts[k] += 1;
                }
            }
            BarSeries { group, counts }
        })
        .collect();

    Ok(GroupedBarArtifact {
        schema_version: "trialstat_grouped_bar_v0".to_string(),
        variable: variable.to_string(),
        title: format!(
            "{} by group",
            schema::variable(variable).map_or(variable, |v| v.display_name)
        ),
        levels,
        series,
    })
}
