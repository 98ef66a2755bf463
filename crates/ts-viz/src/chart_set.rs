//! The fixed chart battery, built artifact by artifact.
//!
//! Every artifact is produced independently. A failing builder becomes an
//! [`Error::Render`] entry for its id; the remaining artifacts still render.

use serde::Serialize;
use ts_core::{CleanDataset, Error, ReportError, Result};

use crate::bars::{GroupedBarArtifact, grouped_bar_artifact};
use crate::boxplot::{BoxArtifact, box_artifact};
use crate::corr::{CorrArtifact, corr_artifact};
use crate::evolution::{MeanEvolutionArtifact, mean_evolution_artifact};
use crate::fear_levels::{FearLevelArtifact, fear_level_artifact};
use crate::frequency::{FrequencyArtifact, frequency_artifact};

/// Any chart artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartArtifact {
    /// Frequency table / pie.
    Pie(FrequencyArtifact),
    /// Per-group box summary.
    Box(BoxArtifact),
    /// Grouped bar counts.
    Bar(GroupedBarArtifact),
    /// Mean evolution line.
    Line(MeanEvolutionArtifact),
    /// Stacked fear levels.
    Stacked(FearLevelArtifact),
    /// Correlation heatmap.
    Heatmap(CorrArtifact),
}

/// Outcome of one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartResult {
    /// The artifact was produced.
    Rendered {
        /// The artifact.
        artifact: ChartArtifact,
    },
    /// The artifact could not be produced.
    Failed {
        /// Render error naming the artifact.
        error: ReportError,
    },
}

/// One keyed entry of a [`ChartSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    /// Stable artifact id.
    pub id: String,
    /// Outcome.
    #[serde(flatten)]
    pub result: ChartResult,
}

/// Builder of one artifact.
pub type ChartBuilder = fn(&CleanDataset) -> Result<ChartArtifact>;

/// Id and builder of one chart.
#[derive(Clone, Copy)]
pub struct ChartSpec {
    /// Stable artifact id.
    pub id: &'static str,
    /// Builder.
    pub build: ChartBuilder,
}

/// The fixed chart battery, in report order.
pub const CHARTS: [ChartSpec; 11] = [
    ChartSpec {
        id: "pie_marital_status",
        build: |d| Ok(ChartArtifact::Pie(frequency_artifact(d, "marital_status")?)),
    },
    ChartSpec {
        id: "pie_income_level",
        build: |d| Ok(ChartArtifact::Pie(frequency_artifact(d, "income_level")?)),
    },
    ChartSpec {
        id: "pie_employment_status",
        build: |d| Ok(ChartArtifact::Pie(frequency_artifact(d, "employment_status")?)),
    },
    ChartSpec {
        id: "pie_planned_pregnancy",
        build: |d| Ok(ChartArtifact::Pie(frequency_artifact(d, "planned_pregnancy")?)),
    },
    ChartSpec { id: "box_age", build: |d| Ok(ChartArtifact::Box(box_artifact(d, "age")?)) },
    ChartSpec {
        id: "box_gestational_week",
        build: |d| Ok(ChartArtifact::Box(box_artifact(d, "gestational_week")?)),
    },
    ChartSpec {
        id: "bar_education",
        build: |d| Ok(ChartArtifact::Bar(grouped_bar_artifact(d, "education")?)),
    },
    ChartSpec {
        id: "bar_labor_onset",
        build: |d| Ok(ChartArtifact::Bar(grouped_bar_artifact(d, "labor_onset")?)),
    },
    ChartSpec { id: "line_fear_vas", build: |d| Ok(ChartArtifact::Line(mean_evolution_artifact(d)?)) },
    ChartSpec {
        id: "stacked_fear_levels",
        build: |d| Ok(ChartArtifact::Stacked(fear_level_artifact(d)?)),
    },
    ChartSpec { id: "heatmap_correlation", build: |d| Ok(ChartArtifact::Heatmap(corr_artifact(d)?)) },
];

/// Keyed chart results, in build order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    /// Artifact schema tag.
    pub schema_version: String,
    /// One entry per chart.
    pub entries: Vec<ChartEntry>,
}

impl ChartSet {
    /// Build every chart in `specs`, isolating failures per artifact.
    pub fn build(data: &CleanDataset, specs: &[ChartSpec]) -> Self {
        let entries = specs
            .iter()
            .map(|spec| {
                let result = match (spec.build)(data) {
                    Ok(artifact) => ChartResult::Rendered { artifact },
                    Err(e) => {
                        let err =
                            Error::Render { artifact: spec.id.to_string(), reason: e.to_string() };
                        log::warn!("{err}");
                        ChartResult::Failed { error: ReportError::from(&err) }
                    }
                };
                ChartEntry { id: spec.id.to_string(), result }
            })
            .collect();
        Self { schema_version: "trialstat_chart_set_v0".to_string(), entries }
    }

    /// Entry by id.
    pub fn get(&self, id: &str) -> Option<&ChartEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Artifact by id, if it rendered.
    pub fn artifact(&self, id: &str) -> Option<&ChartArtifact> {
        match &self.get(id)?.result {
            ChartResult::Rendered { artifact } => Some(artifact),
            ChartResult::Failed { .. } => None,
        }
    }

    /// Ids of rendered artifacts.
    pub fn rendered(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, ChartResult::Rendered { .. }))
            .map(|e| e.id.as_str())
    }

    /// Failed entries with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ReportError)> {
        self.entries.iter().filter_map(|e| match &e.result {
            ChartResult::Failed { error } => Some((e.id.as_str(), error)),
            ChartResult::Rendered { .. } => None,
        })
    }
}

/// Build the full chart battery.
pub fn build_chart_set(data: &CleanDataset) -> ChartSet {
    ChartSet::build(data, &CHARTS)
}
