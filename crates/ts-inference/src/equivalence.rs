//! Phase 1: baseline equivalence.

use ts_core::schema::{self, GROUP_COLUMN, VariableKind, VariableSpec};
use ts_core::{
    AnalysisConfig, BaselineComparison, BaselineStatistic, CleanDataset, EquivalenceResult, Error,
    Result,
};

use crate::contingency::{ContingencyTable, chi2_independence};
use crate::partition::Cohorts;
use crate::welch::{summarize, welch_t_test};

fn baseline_error(spec: &VariableSpec, cause: Error, fix: &str) -> Error {
    // Validation causes carry their own message; drop the variant prefix.
    let cause = match cause {
        Error::Validation(msg) => msg,
        other => other.to_string(),
    };
    Error::BaselineTest { variable: spec.display_name.to_string(), reason: format!("{cause}; {fix}") }
}

fn compare_numeric(
    spec: &VariableSpec,
    data: &CleanDataset,
    cohorts: &Cohorts,
) -> Result<BaselineComparison> {
    let column = data.require_numeric(spec.name)?;
    let (a, b) = cohorts.split_numeric(column);
    if a.len() < 2 || b.len() < 2 {
        let reason = format!(
            "each cohort needs at least 2 non-missing values (got {} and {})",
            a.len(),
            b.len()
        );
        log::warn!("baseline '{}' not testable: {reason}", spec.display_name);
        return Ok(BaselineComparison {
            variable: spec.name.to_string(),
            display_name: spec.display_name.to_string(),
            kind: VariableKind::Numeric,
            statistic: BaselineStatistic::Untestable { reason },
            p_value: None,
            intervention: Some(summarize(&a)),
            control: Some(summarize(&b)),
        });
    }
    let test = welch_t_test(&a, &b).map_err(|e| {
        baseline_error(spec, e, "check this variable for extreme or constant values")
    })?;
    log::debug!("{}: t={:.4} df={:.2} p={:.6}", spec.name, test.t, test.df, test.p_value);
    Ok(BaselineComparison {
        variable: spec.name.to_string(),
        display_name: spec.display_name.to_string(),
        kind: VariableKind::Numeric,
        statistic: BaselineStatistic::Welch { t: test.t, df: test.df },
        p_value: Some(test.p_value),
        intervention: Some(test.a),
        control: Some(test.b),
    })
}

fn compare_categorical(
    spec: &VariableSpec,
    data: &CleanDataset,
    config: &AnalysisConfig,
) -> Result<BaselineComparison> {
    let groups = data.require_categorical(GROUP_COLUMN)?;
    let levels = data.require_categorical(spec.name)?;
    let table = ContingencyTable::from_pairs(
        groups
            .iter()
            .zip(levels)
            .filter_map(|(g, l)| Some((g.as_deref()?, l.as_deref()?))),
    );
    if table.col_labels.len() > config.max_categorical_levels {
        return Err(baseline_error(
            spec,
            Error::Validation(format!(
                "{} distinct levels exceed the limit of {}",
                table.col_labels.len(),
                config.max_categorical_levels
            )),
            "use the category codes listed in the template",
        ));
    }
    let test = chi2_independence(&table)
        .map_err(|e| baseline_error(spec, e, "enter a category for the subjects of both groups"))?;
    log::debug!(
        "{}: chi2={:.4} dof={} yates={} p={:.6}",
        spec.name,
        test.statistic,
        test.dof,
        test.yates,
        test.p_value
    );
    Ok(BaselineComparison {
        variable: spec.name.to_string(),
        display_name: spec.display_name.to_string(),
        kind: VariableKind::Categorical,
        statistic: BaselineStatistic::ChiSquare {
            statistic: test.statistic,
            dof: test.dof,
            yates: test.yates,
        },
        p_value: Some(test.p_value),
        intervention: None,
        control: None,
    })
}

/// Run every baseline comparison in fixed order: Welch tests on the numeric
/// baseline variables (cohorts only), then chi-square tests of group ×
/// level on the categorical ones (whole dataset).
///
/// A numeric variable with fewer than two values in a cohort is recorded as
/// untestable and does not fail. Any other comparison that cannot be
/// computed is an [`Error::BaselineTest`] naming the variable.
pub fn run_equivalence(
    data: &CleanDataset,
    cohorts: &Cohorts,
    config: &AnalysisConfig,
) -> Result<EquivalenceResult> {
    let comparisons = schema::equivalence_variables()
        .map(|spec| match spec.kind {
            VariableKind::Numeric => compare_numeric(spec, data, cohorts),
            VariableKind::Categorical => compare_categorical(spec, data, config),
        })
        .collect::<Result<Vec<_>>>()?;

    let failing: Vec<String> = comparisons
        .iter()
        .filter(|c| c.p_value.is_some_and(|p| config.is_significant(p)))
        .map(|c| c.display_name.clone())
        .collect();
    let equivalent = failing.is_empty();

    if equivalent {
        log::info!("phase 1: all {} baseline comparisons equivalent", comparisons.len());
    } else {
        log::info!("phase 1: not equivalent on {}", failing.join(", "));
    }
    Ok(EquivalenceResult { comparisons, equivalent, failing })
}
