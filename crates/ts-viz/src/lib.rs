//! # ts-viz
//!
//! Chart artifacts for TrialStat reports.
//!
//! Artifacts are plot-friendly, numbers-first structures (arrays instead of
//! nested objects). Rendering them to images is left to the consumer.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Grouped bar counts per level and group.
pub mod bars;
/// Per-group box summaries.
pub mod boxplot;
/// Keyed, failure-isolated chart battery.
pub mod chart_set;
/// Pairwise-complete correlation heatmap.
pub mod corr;
/// Mean VAS fear evolution.
pub mod evolution;
/// Low / moderate / high VAS fear shares.
pub mod fear_levels;
/// Frequency tables (pie charts).
pub mod frequency;

mod groups;

pub use bars::{BarSeries, GroupedBarArtifact, grouped_bar_artifact};
pub use boxplot::{BoxArtifact, BoxGroup, box_artifact};
pub use chart_set::{
    CHARTS, ChartArtifact, ChartBuilder, ChartEntry, ChartResult, ChartSet, ChartSpec,
    build_chart_set,
};
pub use corr::{CorrArtifact, corr_artifact, pairwise_pearson};
pub use evolution::{MeanEvolutionArtifact, MeanSeries, mean_evolution_artifact};
pub use fear_levels::{FearLevelArtifact, FearLevelPanel, fear_level, fear_level_artifact};
pub use frequency::{FrequencyArtifact, FrequencySlice, frequency_artifact};
