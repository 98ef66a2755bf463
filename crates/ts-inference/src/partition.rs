use ts_core::schema::GROUP_COLUMN;
use ts_core::{AnalysisConfig, CleanDataset, Error, Result};

/// Row indices of the two comparison cohorts.
///
/// Rows with any other group label (or none) belong to neither cohort. They
/// stay in the dataset and still count in contingency tables, which are
/// built against the unfiltered group column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohorts {
    /// Rows labelled with the intervention label.
    pub intervention: Vec<usize>,
    /// Rows labelled with the control label.
    pub control: Vec<usize>,
}

impl Cohorts {
    /// Non-missing values of `column` for each cohort: `(intervention, control)`.
    pub fn split_numeric(&self, column: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
        let pick = |rows: &[usize]| rows.iter().filter_map(|&i| column[i]).collect::<Vec<_>>();
        (pick(&self.intervention), pick(&self.control))
    }
}

/// Split rows into the intervention and control cohorts by exact label match.
pub fn partition(data: &CleanDataset, config: &AnalysisConfig) -> Result<Cohorts> {
    let groups = data.categorical(GROUP_COLUMN).ok_or_else(|| Error::MissingGroupColumn {
        column: GROUP_COLUMN.to_string(),
        intervention: config.intervention_label.clone(),
        control: config.control_label.clone(),
    })?;

    let mut cohorts = Cohorts { intervention: Vec::new(), control: Vec::new() };
    for (i, label) in groups.iter().enumerate() {
        match label.as_deref() {
            Some(l) if l == config.intervention_label => cohorts.intervention.push(i),
            Some(l) if l == config.control_label => cohorts.control.push(i),
            _ => {}
        }
    }

    let excluded = data.n_rows() - cohorts.intervention.len() - cohorts.control.len();
    if excluded > 0 {
        log::warn!(
            "{} row(s) carry neither '{}' nor '{}' and are excluded from two-sample comparisons",
            excluded,
            config.intervention_label,
            config.control_label
        );
    }
    log::debug!(
        "cohorts: {}={} {}={}",
        config.intervention_label,
        cohorts.intervention.len(),
        config.control_label,
        cohorts.control.len()
    );
    Ok(cohorts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[Option<&str>]) -> Vec<Option<String>> {
        v.iter().map(|s| s.map(String::from)).collect()
    }

    #[test]
    fn test_partition_by_label() {
        let data = CleanDataset::new(5)
            .with_categorical(
                GROUP_COLUMN,
                labels(&[
                    Some("Intervention"),
                    Some("Control"),
                    Some("Pilot"),
                    None,
                    Some("Intervention"),
                ]),
            )
            .unwrap();
        let c = partition(&data, &AnalysisConfig::default()).unwrap();
        assert_eq!(c.intervention, vec![0, 4]);
        assert_eq!(c.control, vec![1]);
    }

    #[test]
    fn test_custom_labels() {
        let data = CleanDataset::new(2)
            .with_categorical(GROUP_COLUMN, labels(&[Some("Placebo"), Some("Drug")]))
            .unwrap();
        let cfg = AnalysisConfig {
            intervention_label: "Drug".into(),
            control_label: "Placebo".into(),
            ..Default::default()
        };
        let c = partition(&data, &cfg).unwrap();
        assert_eq!(c.intervention, vec![1]);
        assert_eq!(c.control, vec![0]);
    }

    #[test]
    fn test_missing_group_column() {
        let data = CleanDataset::new(1);
        let err = partition(&data, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingGroupColumn { .. }));
        assert!(err.to_string().contains("'group'"));
    }

    #[test]
    fn test_split_numeric_omits_missing() {
        let cohorts = Cohorts { intervention: vec![0, 1], control: vec![2, 3] };
        let col = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let (a, b) = cohorts.split_numeric(&col);
        assert_eq!(a, vec![1.0]);
        assert_eq!(b, vec![3.0, 4.0]);
    }
}
