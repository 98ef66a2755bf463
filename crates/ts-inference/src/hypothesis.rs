//! Phase 2: covariate-adjusted hypothesis tests.

use ts_core::schema::{GROUP_COLUMN, HYPOTHESES};
use ts_core::{
    AnalysisConfig, CleanDataset, CorrectionSet, Error, HypothesisFit, HypothesisOutcome,
    HypothesisResult, HypothesisSpec, HypothesisStatus, ReportError, Result,
};

use crate::ancova::{ModelSpec, fit_group_term};

/// Model of one hypothesis with the correction terms appended.
pub fn model_for(spec: &HypothesisSpec, correction: &CorrectionSet) -> ModelSpec {
    ModelSpec::new(spec.outcome, GROUP_COLUMN, spec.pretest).with_corrections(correction)
}

/// Fit one hypothesis and test its group term.
///
/// An infeasible model is an [`Error::ModelFit`] naming the hypothesis.
pub fn test_hypothesis(
    spec: &HypothesisSpec,
    data: &CleanDataset,
    correction: &CorrectionSet,
    config: &AnalysisConfig,
) -> Result<HypothesisFit> {
    let model = model_for(spec, correction);
    let test = fit_group_term(&model, data).map_err(|e| Error::ModelFit {
        hypothesis: spec.id.to_string(),
        reason: format!("{e} ({}); {}", model.formula(), e.remediation()),
    })?;
    Ok(HypothesisFit {
        n_obs: test.n_obs,
        f_statistic: test.f_statistic,
        df_num: test.df_num,
        df_den: test.df_den,
        p_value: test.p_value,
        reference_level: test.reference_level,
        effects: test.effects,
        supported: config.is_significant(test.p_value),
    })
}

/// Run the five fixed hypotheses independently.
///
/// A hypothesis whose model is infeasible is recorded as failed; the others
/// still compute.
pub fn run_hypotheses(
    data: &CleanDataset,
    correction: &CorrectionSet,
    config: &AnalysisConfig,
) -> HypothesisResult {
    let outcomes = HYPOTHESES
        .iter()
        .map(|spec| {
            let formula = model_for(spec, correction).formula();
            let status = match test_hypothesis(spec, data, correction, config) {
                Ok(fit) => {
                    log::debug!("{}: p={:.6} supported={}", spec.id, fit.p_value, fit.supported);
                    HypothesisStatus::Fitted(fit)
                }
                Err(err) => {
                    log::warn!("{err}");
                    HypothesisStatus::Failed { error: ReportError::from(&err) }
                }
            };
            HypothesisOutcome {
                id: spec.id.to_string(),
                label: spec.label.to_string(),
                formula,
                status,
            }
        })
        .collect();
    let result = HypothesisResult { outcomes };
    log::info!(
        "phase 2: {} supported, {} failed",
        result
            .outcomes
            .iter()
            .filter(|o| matches!(&o.status, HypothesisStatus::Fitted(f) if f.supported))
            .count(),
        result.failures().count()
    );
    result
}
