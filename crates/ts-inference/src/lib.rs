//! # ts-inference
//!
//! Statistical decision pipeline for a two-arm trial report.
//!
//! Data flows strictly forward:
//! validator → partitioner → equivalence engine → covariate selector →
//! hypothesis engine → narrative classifier.
//!
//! Every stage is a pure function of its inputs. Nothing is cached between
//! calls, so independent analyses can run concurrently.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Covariate-adjusted OLS and the type-III group test.
pub mod ancova;
/// Pearson chi-square test of independence on a contingency table.
pub mod contingency;
/// Dynamic covariate selection from failing baseline variables.
pub mod covariates;
/// Phase 1: baseline equivalence.
pub mod equivalence;
/// Phase 2: the five fixed hypotheses.
pub mod hypothesis;
/// Narrative classification of the combined result.
pub mod narrative;
/// Cohort split by group label.
pub mod partition;
/// End-to-end analysis entry points.
pub mod pipeline;
/// Schema validation and numeric coercion.
pub mod validate;
/// Welch's unequal-variance t-test.
pub mod welch;

pub use ancova::{FitFailure, GroupTermTest, ModelSpec, fit_group_term};
pub use contingency::{ChiSquareTest, ContingencyTable, chi2_independence};
pub use covariates::select_covariates;
pub use equivalence::run_equivalence;
pub use hypothesis::{run_hypotheses, test_hypothesis};
pub use narrative::{classify, narrate};
pub use partition::{Cohorts, partition};
pub use pipeline::{analyze, analyze_clean, run_analysis};
pub use validate::validate;
pub use welch::{WelchTest, welch_t_test};
