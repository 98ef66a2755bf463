//! Error types for TrialStat

use thiserror::Error;

/// TrialStat error type.
///
/// Every user-facing variant names the offending variable(s) or hypothesis
/// and carries a remediation hint in its message.
#[derive(Error, Debug)]
pub enum Error {
    /// Required template columns are absent from the input.
    #[error(
        "the uploaded file is not a TrialStat template; missing required columns: {}. \
         Download the empty template and enter the data there",
        .columns.join(", ")
    )]
    MissingColumns {
        /// Every required column that is missing, in schema order.
        columns: Vec<String>,
    },

    /// Every numeric cell is empty or non-numeric after coercion.
    #[error(
        "no numeric data to analyse: the numeric columns ({}) are entirely empty or contain \
         only text such as 'unknown' or 'N/A'. Check the data entries",
        .columns.join(", ")
    )]
    EmptyNumericData {
        /// The numeric columns that were inspected.
        columns: Vec<String>,
    },

    /// The group column is absent.
    #[error(
        "group column '{column}' not found. Use the template and label every subject \
         '{intervention}' or '{control}'"
    )]
    MissingGroupColumn {
        /// Name of the expected group column.
        column: String,
        /// Label of the intervention cohort.
        intervention: String,
        /// Label of the control cohort.
        control: String,
    },

    /// A baseline comparison could not be computed.
    #[error("baseline test for '{variable}' could not be computed: {reason}")]
    BaselineTest {
        /// Display name of the baseline variable.
        variable: String,
        /// What went wrong and how to fix it.
        reason: String,
    },

    /// A hypothesis model became infeasible on its filtered rows.
    #[error("model fit failed for hypothesis {hypothesis}: {reason}")]
    ModelFit {
        /// Hypothesis identifier (e.g. `H2a`).
        hypothesis: String,
        /// What went wrong and how to fix it.
        reason: String,
    },

    /// A presentation artifact could not be produced.
    #[error("could not render '{artifact}': {reason}")]
    Render {
        /// Artifact identifier.
        artifact: String,
        /// Cause of the failure.
        reason: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingColumns { .. } => "missing_columns",
            Error::EmptyNumericData { .. } => "empty_numeric_data",
            Error::MissingGroupColumn { .. } => "missing_group_column",
            Error::BaselineTest { .. } => "baseline_test",
            Error::ModelFit { .. } => "model_fit",
            Error::Render { .. } => "render",
            Error::Validation(_) => "validation",
            Error::Io(_) => "io",
            Error::Csv(_) => "csv",
            Error::Json(_) => "json",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_column() {
        let err = Error::MissingColumns { columns: vec!["age".into(), "group".into()] };
        let msg = err.to_string();
        assert!(msg.contains("age, group"), "{msg}");
        assert!(msg.contains("template"));
        assert_eq!(err.kind(), "missing_columns");
    }

    #[test]
    fn test_model_fit_names_hypothesis() {
        let err = Error::ModelFit { hypothesis: "H2a".into(), reason: "no complete rows".into() };
        assert_eq!(err.to_string(), "model fit failed for hypothesis H2a: no complete rows");
    }
}
