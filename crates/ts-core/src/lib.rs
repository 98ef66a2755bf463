//! # ts-core
//!
//! Core types, schema and error handling for TrialStat.
//!
//! This crate provides:
//! - The error taxonomy shared by every stage of the analysis
//! - The fixed study schema (variables, roles, hypotheses)
//! - Raw and cleaned dataset containers with CSV loading
//! - Analysis configuration
//! - Report types consumed by presentation layers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod schema;
pub mod types;

pub use config::AnalysisConfig;
pub use dataset::{CleanDataset, Dataset};
pub use error::{Error, Result};
pub use schema::{HypothesisSpec, SchemaGuide, VariableKind, VariableRole, VariableSpec};
pub use types::{
    AnalysisReport, AnalysisSummary, BaselineComparison, BaselineStatistic, CohortSummary,
    CorrectionSet, CovariateTerm, EquivalenceResult, GroupEffect, HypothesisFit,
    HypothesisOutcome, HypothesisResult, HypothesisStatus, Narrative, NarrativeCategory,
    ReportError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
