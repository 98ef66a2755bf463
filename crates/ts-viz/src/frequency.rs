//! Frequency table / pie artifact for one categorical variable.

use std::collections::BTreeMap;

use serde::Serialize;
use ts_core::schema;
use ts_core::{CleanDataset, Error, Result};

/// Level counts of one categorical variable over the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Column name.
    pub variable: String,
    /// Display title.
    pub title: String,
    /// Non-missing observations.
    pub total: usize,
    /// Slices, largest first.
    pub slices: Vec<FrequencySlice>,
}

/// One level of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencySlice {
    /// Level label.
    pub level: String,
    /// Count.
    pub count: usize,
    /// Share of `total`.
    pub fraction: f64,
}

/// Count the levels of `variable`. Slices are ordered by count (descending), then label.
pub fn frequency_artifact(data: &CleanDataset, variable: &str) -> Result<FrequencyArtifact> {
    let column = data.require_categorical(variable)?;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in column.iter().flatten() {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return Err(Error::Validation(format!("'{variable}' has no values")));
    }

    let mut slices: Vec<FrequencySlice> = counts
        .into_iter()
        .map(|(level, count)| FrequencySlice {
            level: level.to_string(),
            count,
            fraction: count as f64 / total as f64,
        })
        .collect();
    // Stable sort keeps the label order among equal counts.
    slices.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(FrequencyArtifact {
        schema_version: "trialstat_frequency_v0".to_string(),
        variable: variable.to_string(),
        title: schema::variable(variable).map_or(variable, |v| v.display_name).to_string(),
        total,
        slices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts_and_order() {
        let col = ["single", "married", "married", "divorced", "", "married", "single"]
            .iter()
            .map(|s| if s.is_empty() { None } else { Some(s.to_string()) })
            .collect();
        let data = CleanDataset::new(7).with_categorical("marital_status", col).unwrap();
        let a = frequency_artifact(&data, "marital_status").unwrap();
        assert_eq!(a.title, "Marital Status");
        assert_eq!(a.total, 6);
        let levels: Vec<_> = a.slices.iter().map(|s| (s.level.as_str(), s.count)).collect();
        assert_eq!(levels, vec![("married", 3), ("single", 2), ("divorced", 1)]);
        assert_relative_eq!(a.slices.iter().map(|s| s.fraction).sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_column_fails() {
        let data = CleanDataset::new(2).with_categorical("income_level", vec![None, None]).unwrap();
        assert!(frequency_artifact(&data, "income_level").is_err());
        assert!(frequency_artifact(&data, "nope").is_err());
    }
}
