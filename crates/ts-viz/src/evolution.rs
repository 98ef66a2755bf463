//! Mean VAS fear per group across the three measurement times.

use serde::Serialize;
use ts_core::{CleanDataset, Error, Result};

use crate::groups::{rows_by_group, values_at};

/// Measurement times and their columns, in chart order.
pub const FEAR_VAS_TIMES: [(&str, &str); 3] =
    [("Baseline", "fear_vas_baseline"), ("4cm", "fear_vas_4cm"), ("8cm", "fear_vas_8cm")];

/// Mean VAS fear per group across the three measurement times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanEvolutionArtifact {
    /// Artifact schema tag.
    pub schema_version: String,
    /// Display title.
    pub title: String,
    /// Time labels.
    pub times: Vec<String>,
    /// One series per observed group.
    pub series: Vec<MeanSeries>,
}

/// Means of one group aligned with `times`; `None` where the group has no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanSeries {
    /// Group label.
    pub group: String,
    /// Non-missing observations per time.
    pub n: Vec<usize>,
    /// Mean per time.
    pub means: Vec<Option<f64>>,
}

/// Per-group means of VAS fear at baseline, 4cm and 8cm.
pub fn mean_evolution_artifact(data: &CleanDataset) -> Result<MeanEvolutionArtifact> {
    let columns = FEAR_VAS_TIMES
        .iter()
        .map(|(_, col)| data.require_numeric(col))
        .collect::<Result<Vec<_>>>()?;

    let series: Vec<MeanSeries> = rows_by_group(data)?
        .into_iter()
        .map(|(group, rows)| {
            let (n, means) = columns
                .iter()
                .map(|col| {
                    let v = values_at(col, &rows);
                    let mean = (!v.is_empty()).then(|| v.iter().sum::<f64>() / v.len() as f64);
                    (v.len(), mean)
                })
                .unzip();
            MeanSeries { group, n, means }
        })
        .collect();
    if series.iter().all(|s| s.means.iter().all(Option::is_none)) {
        return Err(Error::Validation("VAS fear columns have no values".to_string()));
    }

    Ok(MeanEvolutionArtifact {
        schema_version: "trialstat_mean_evolution_v0".to_string(),
        title: "Mean VAS fear over time".to_string(),
        times: FEAR_VAS_TIMES.iter().map(|(t, _)| t.to_string()).collect(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ts_core::schema::GROUP_COLUMN;

    #[test]
    fn test_means_per_group_and_time() {
        let data = CleanDataset::new(4)
            .with_categorical(
                GROUP_COLUMN,
                ["Control", "Control", "Intervention", "Intervention"]
                    .iter()
                    .map(|s| Some(s.to_string()))
                    .collect(),
            )
            .unwrap()
            .with_numeric("fear_vas_baseline", vec![Some(6.0), Some(8.0), Some(5.0), Some(7.0)])
            .unwrap()
            .with_numeric("fear_vas_4cm", vec![Some(6.0), None, Some(3.0), Some(4.0)])
            .unwrap()
            .with_numeric("fear_vas_8cm", vec![Some(7.0), Some(9.0), None, None])
            .unwrap();
        let a = mean_evolution_artifact(&data).unwrap();
        assert_eq!(a.times, vec!["Baseline", "4cm", "8cm"]);
        let control = &a.series[0];
        assert_eq!(control.n, vec![2, 1, 2]);
        assert_relative_eq!(control.means[0].unwrap(), 7.0);
        let intervention = &a.series[1];
        assert_relative_eq!(intervention.means[1].unwrap(), 3.5);
        assert_eq!(intervention.means[2], None);
    }
}
