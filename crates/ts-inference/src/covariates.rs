use ts_core::schema::{self, VariableRole};
use ts_core::{CorrectionSet, CovariateTerm, EquivalenceResult, Error, Result};

/// Turn every failing baseline variable into a covariate term, in discovery order.
///
/// Numeric variables become linear terms, categorical ones factor terms. The
/// set is empty exactly when the baseline is equivalent.
pub fn select_covariates(equivalence: &EquivalenceResult) -> Result<CorrectionSet> {
    let terms = equivalence
        .failing
        .iter()
        .map(|display| {
            let spec = schema::variable_by_display_name(display)
                .filter(|v| {
                    v.has_role(VariableRole::EquivalenceNumeric)
                        || v.has_role(VariableRole::EquivalenceCategoric)
                })
                .ok_or_else(|| {
                    Error::Validation(format!("'{display}' is not a baseline variable"))
                })?;
            Ok(CovariateTerm {
                variable: spec.name.to_string(),
                display_name: spec.display_name.to_string(),
                kind: spec.kind,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let set = CorrectionSet::from_terms(terms);
    if !set.is_empty() {
        log::info!("dynamic correction:{}", set.formula());
    }
    Ok(set)
}
