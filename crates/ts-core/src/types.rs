//! Result types produced by the analysis pipeline.
//!
//! All types are immutable values computed once per analysis invocation.

use serde::Serialize;

use crate::Error;
use crate::schema::VariableKind;

// ---------------------------------------------------------------------------
// Phase 1: baseline equivalence
// ---------------------------------------------------------------------------

/// Test statistic behind one baseline p-value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum BaselineStatistic {
    /// Welch two-sample t-test.
    Welch {
        /// t statistic (intervention minus control).
        t: f64,
        /// Welch–Satterthwaite degrees of freedom.
        df: f64,
    },
    /// Pearson chi-square test of independence.
    ChiSquare {
        /// Chi-square statistic.
        statistic: f64,
        /// Degrees of freedom `(rows - 1) * (cols - 1)`.
        dof: usize,
        /// Whether the Yates continuity correction was applied.
        yates: bool,
    },
    /// Too few observations to run the test; the comparison does not fail.
    Untestable {
        /// Why the test could not run.
        reason: String,
    },
}

/// Size, mean and standard deviation of one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    /// Non-missing observations.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub sd: f64,
}

/// One baseline comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineComparison {
    /// Column name.
    pub variable: String,
    /// Display name.
    pub display_name: String,
    /// Numeric (Welch) or categorical (contingency).
    pub kind: VariableKind,
    /// Test statistic.
    pub statistic: BaselineStatistic,
    /// Two-sided p-value; `None` when the comparison was untestable.
    pub p_value: Option<f64>,
    /// Intervention cohort summary (numeric variables only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervention: Option<CohortSummary>,
    /// Control cohort summary (numeric variables only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<CohortSummary>,
}

/// Outcome of the baseline-equivalence phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquivalenceResult {
    /// Comparisons in fixed iteration order (numeric first, then categoric).
    pub comparisons: Vec<BaselineComparison>,
    /// `true` iff no comparison is significant. Untestable comparisons do not fail.
    pub equivalent: bool,
    /// Display names of significant comparisons, in iteration order.
    pub failing: Vec<String>,
}

impl EquivalenceResult {
    /// p-value by display name; `None` when unknown or untestable.
    pub fn p_value(&self, display_name: &str) -> Option<f64> {
        self.comparisons.iter().find(|c| c.display_name == display_name).and_then(|c| c.p_value)
    }

    /// Display names of comparisons that could not be tested.
    pub fn untestable(&self) -> impl Iterator<Item = &str> {
        self.comparisons.iter().filter(|c| c.p_value.is_none()).map(|c| c.display_name.as_str())
    }

    /// Comparisons of the given kind, in iteration order.
    pub fn of_kind(&self, kind: VariableKind) -> impl Iterator<Item = &BaselineComparison> {
        self.comparisons.iter().filter(move |c| c.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Dynamic covariates
// ---------------------------------------------------------------------------

/// One covariate term added because its baseline comparison failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CovariateTerm {
    /// Column name.
    pub variable: String,
    /// Display name.
    pub display_name: String,
    /// Numeric (linear term) or categorical (factor term).
    pub kind: VariableKind,
}

impl CovariateTerm {
    /// Formula fragment: `name` for numeric terms, `C(name)` for factors.
    pub fn fragment(&self) -> String {
        match self.kind {
            VariableKind::Numeric => self.variable.clone(),
            VariableKind::Categorical => format!("C({})", self.variable),
        }
    }
}

/// Ordered covariate terms appended to every hypothesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionSet {
    terms: Vec<CovariateTerm>,
    formula: String,
}

impl CorrectionSet {
    /// Build from terms in discovery order.
    pub fn from_terms(terms: Vec<CovariateTerm>) -> Self {
        let formula = terms.iter().map(|t| format!(" + {}", t.fragment())).collect();
        Self { terms, formula }
    }

    /// Terms in discovery order.
    pub fn terms(&self) -> &[CovariateTerm] {
        &self.terms
    }

    /// Covariate string appended to base relations; empty when no correction applies.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Whether no correction applies.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Numeric covariate columns, in discovery order.
    pub fn numeric_terms(&self) -> impl Iterator<Item = &CovariateTerm> {
        self.terms.iter().filter(|t| t.kind == VariableKind::Numeric)
    }

    /// Categorical covariate columns, in discovery order.
    pub fn categorical_terms(&self) -> impl Iterator<Item = &CovariateTerm> {
        self.terms.iter().filter(|t| t.kind == VariableKind::Categorical)
    }
}

// ---------------------------------------------------------------------------
// Phase 2: hypotheses
// ---------------------------------------------------------------------------

/// Adjusted difference of one group level against the reference level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEffect {
    /// Non-reference group level.
    pub level: String,
    /// Coefficient of the level's dummy column.
    pub estimate: f64,
}

/// Type-III test of the group term for one fitted hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisFit {
    /// Rows used after per-hypothesis filtering.
    pub n_obs: usize,
    /// F statistic of the group term.
    pub f_statistic: f64,
    /// Numerator degrees of freedom (group levels - 1).
    pub df_num: usize,
    /// Residual degrees of freedom of the full model.
    pub df_den: usize,
    /// p-value of the group term.
    pub p_value: f64,
    /// Reference group level.
    pub reference_level: String,
    /// Adjusted effects of the other levels.
    pub effects: Vec<GroupEffect>,
    /// `p_value < alpha`.
    pub supported: bool,
}

/// Fit status of one hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HypothesisStatus {
    /// The model was fitted.
    Fitted(HypothesisFit),
    /// The model was infeasible on the filtered rows.
    Failed {
        /// The model-fit error.
        error: ReportError,
    },
}

/// One hypothesis with its relation and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisOutcome {
    /// Hypothesis identifier.
    pub id: String,
    /// Human-readable description.
    pub label: String,
    /// Relation actually fitted, including dynamic covariates.
    pub formula: String,
    /// Fit status.
    #[serde(flatten)]
    pub status: HypothesisStatus,
}

impl HypothesisOutcome {
    /// Group p-value, if the hypothesis was fitted.
    pub fn p_value(&self) -> Option<f64> {
        match &self.status {
            HypothesisStatus::Fitted(fit) => Some(fit.p_value),
            HypothesisStatus::Failed { .. } => None,
        }
    }
}

/// Outcomes of the five hypotheses, in report order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisResult {
    /// One outcome per hypothesis.
    pub outcomes: Vec<HypothesisOutcome>,
}

impl HypothesisResult {
    /// Outcome by hypothesis id.
    pub fn get(&self, id: &str) -> Option<&HypothesisOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    /// Group p-value by hypothesis id; `None` when unknown or failed.
    pub fn p_value(&self, id: &str) -> Option<f64> {
        self.get(id).and_then(|o| o.p_value())
    }

    /// Whether any fitted hypothesis is supported.
    pub fn any_supported(&self) -> bool {
        self.outcomes.iter().any(|o| matches!(&o.status, HypothesisStatus::Fitted(f) if f.supported))
    }

    /// Hypotheses whose model could not be fitted.
    pub fn failures(&self) -> impl Iterator<Item = &HypothesisOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.status, HypothesisStatus::Failed { .. }))
    }
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

/// Final conclusion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeCategory {
    /// Equivalent baseline, significant effect.
    StrongPositive,
    /// Non-equivalent baseline corrected by covariates, significant effect.
    CorrectedPositive,
    /// Equivalent baseline, no significant effect.
    Neutral,
    /// Non-equivalent baseline, no significant effect.
    Inconclusive,
}

impl NarrativeCategory {
    /// Fixed title of the category.
    pub fn title(self) -> &'static str {
        match self {
            NarrativeCategory::StrongPositive => "Strong positive finding",
            NarrativeCategory::CorrectedPositive => "Corrected positive finding",
            NarrativeCategory::Neutral => "Neutral \u{2014} no measurable effect",
            NarrativeCategory::Inconclusive => "Inconclusive",
        }
    }
}

/// Narrative conclusion rendered from a fixed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    /// Category tag.
    pub category: NarrativeCategory,
    /// Category title.
    pub title: String,
    /// Interpretation text.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Serializable error carried by a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportError {
    /// Stable error kind (see [`Error::kind`]).
    pub kind: String,
    /// Message with remediation.
    pub message: String,
}

impl From<&Error> for ReportError {
    fn from(err: &Error) -> Self {
        Self { kind: err.kind().to_string(), message: err.to_string() }
    }
}

impl From<Error> for ReportError {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

/// Every result field of a completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    /// Phase 1.
    pub equivalence: EquivalenceResult,
    /// Dynamic covariates.
    pub correction: CorrectionSet,
    /// Phase 2.
    pub hypotheses: HypothesisResult,
    /// Conclusion.
    pub narrative: Narrative,
}

/// Analysis report: either every result field or a single error, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisReport {
    /// The pipeline ran to completion.
    Completed(Box<AnalysisSummary>),
    /// Validation short-circuited the pipeline.
    Failed {
        /// The sole report content.
        error: ReportError,
    },
}

impl AnalysisReport {
    /// Completed summary, if any.
    pub fn summary(&self) -> Option<&AnalysisSummary> {
        match self {
            AnalysisReport::Completed(s) => Some(s),
            AnalysisReport::Failed { .. } => None,
        }
    }

    /// Error, if the pipeline failed.
    pub fn error(&self) -> Option<&ReportError> {
        match self {
            AnalysisReport::Completed(_) => None,
            AnalysisReport::Failed { error } => Some(error),
        }
    }
}

impl From<crate::Result<AnalysisSummary>> for AnalysisReport {
    fn from(res: crate::Result<AnalysisSummary>) -> Self {
        match res {
            Ok(summary) => AnalysisReport::Completed(Box::new(summary)),
            Err(err) => AnalysisReport::Failed { error: ReportError::from(&err) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(name: &str, kind: VariableKind) -> CovariateTerm {
        CovariateTerm { variable: name.into(), display_name: name.into(), kind }
    }

    #[test]
    fn test_correction_formula_order_and_tags() {
        let set = CorrectionSet::from_terms(vec![
            term("age", VariableKind::Numeric),
            term("education", VariableKind::Categorical),
        ]);
        assert_eq!(set.formula(), " + age + C(education)");
        assert_eq!(set.numeric_terms().count(), 1);
        assert_eq!(set.categorical_terms().count(), 1);
        assert!(CorrectionSet::from_terms(vec![]).formula().is_empty());
    }

    #[test]
    fn test_failed_report_serializes_error_only() {
        let err = Error::MissingColumns { columns: vec!["age".into()] };
        let report = AnalysisReport::from(Err::<AnalysisSummary, _>(err));
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["error"]["kind"], "missing_columns");
        assert!(v.get("equivalence").is_none());
        assert!(report.summary().is_none());
    }

    #[test]
    fn test_hypothesis_outcome_flattens_status() {
        let outcome = HypothesisOutcome {
            id: "H3".into(),
            label: "Anxiety".into(),
            formula: "y ~ group + x".into(),
            status: HypothesisStatus::Failed {
                error: ReportError { kind: "model_fit".into(), message: "no rows".into() },
            },
        };
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["error"]["kind"], "model_fit");
        assert_eq!(outcome.p_value(), None);
    }
}
