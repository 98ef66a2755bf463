//! End-to-end analysis: validate, partition, phase 1, correction, phase 2, narrative.

use ts_core::{AnalysisConfig, AnalysisReport, AnalysisSummary, CleanDataset, Dataset, Result};

use crate::covariates::select_covariates;
use crate::equivalence::run_equivalence;
use crate::hypothesis::run_hypotheses;
use crate::narrative::narrate;
use crate::partition::partition;
use crate::validate::validate;

/// Run the pipeline on an already validated dataset.
pub fn analyze_clean(data: &CleanDataset, config: &AnalysisConfig) -> Result<AnalysisSummary> {
    config.validate()?;
    let cohorts = partition(data, config)?;
    let equivalence = run_equivalence(data, &cohorts, config)?;
    let correction = select_covariates(&equivalence)?;
    let hypotheses = run_hypotheses(data, &correction, config);
    let narrative = narrate(&equivalence, &hypotheses);
    log::info!("analysis complete: {}", narrative.title);
    Ok(AnalysisSummary { equivalence, correction, hypotheses, narrative })
}

/// Validate `dataset` and run the full pipeline.
///
/// Schema and data errors short-circuit; hypothesis fit failures are
/// recorded inside the summary.
pub fn run_analysis(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisSummary> {
    let clean = validate(dataset)?;
    analyze_clean(&clean, config)
}

/// Like [`run_analysis`], but folds any error into the report.
pub fn analyze(dataset: &Dataset, config: &AnalysisConfig) -> AnalysisReport {
    let result = run_analysis(dataset, config);
    if let Err(err) = &result {
        log::warn!("analysis failed: {err}");
    }
    AnalysisReport::from(result)
}
