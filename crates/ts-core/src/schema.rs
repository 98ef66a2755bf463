//! Fixed study schema: the 17 template variables, their roles and the five hypotheses.
//!
//! This table is the single source of truth for variable names, display names
//! and roles. The equivalence engine, the covariate selector and the hypothesis
//! engine all read it; nothing is inferred from the data.

use serde::Serialize;

/// Storage kind of a variable after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Coerced to `f64`; unparsable tokens become missing.
    Numeric,
    /// Kept verbatim as a label.
    Categorical,
}

/// Analytical role of a variable. A variable may carry more than one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    /// The cohort assignment column.
    Group,
    /// Baseline variable compared with a Welch test.
    EquivalenceNumeric,
    /// Baseline variable compared with a contingency test.
    EquivalenceCategoric,
    /// Pre-test measurement used as the ANCOVA covariate.
    PretestCovariate,
    /// Post-test measurement used as an ANCOVA outcome.
    PostTestOutcome,
}

/// One row of the study schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariableSpec {
    /// Column name in the template.
    pub name: &'static str,
    /// Human-readable name used in reports.
    pub display_name: &'static str,
    /// Numeric or categorical.
    pub kind: VariableKind,
    /// Roles in the analysis.
    pub roles: &'static [VariableRole],
}

impl VariableSpec {
    /// Whether the variable carries `role`.
    pub fn has_role(&self, role: VariableRole) -> bool {
        self.roles.contains(&role)
    }
}

/// One fixed ANCOVA hypothesis: `outcome ~ group + pretest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HypothesisSpec {
    /// Short identifier used in reports and errors.
    pub id: &'static str,
    /// Human-readable description.
    pub label: &'static str,
    /// Post-test outcome column.
    pub outcome: &'static str,
    /// Pre-test covariate column.
    pub pretest: &'static str,
}

impl HypothesisSpec {
    /// Base relation without dynamic covariates.
    pub fn base_formula(&self) -> String {
        format!("{} ~ {} + {}", self.outcome, GROUP_COLUMN, self.pretest)
    }
}

/// Name of the group column.
pub const GROUP_COLUMN: &str = "group";

use VariableKind::{Categorical, Numeric};
use VariableRole::{
    EquivalenceCategoric, EquivalenceNumeric, Group, PostTestOutcome, PretestCovariate,
};

/// Every required variable: 10 numeric then 7 categorical, in template order.
pub const STUDY_VARIABLES: [VariableSpec; 17] = [
    VariableSpec { name: "age", display_name: "Age", kind: Numeric, roles: &[EquivalenceNumeric] },
    VariableSpec {
        name: "gestational_week",
        display_name: "Gestational Week",
        kind: Numeric,
        roles: &[EquivalenceNumeric],
    },
    VariableSpec {
        name: "fear_vas_baseline",
        display_name: "Baseline Fear (VAS)",
        kind: Numeric,
        roles: &[EquivalenceNumeric, PretestCovariate],
    },
    VariableSpec {
        name: "fear_scale_baseline",
        display_name: "Baseline Fear (Scale)",
        kind: Numeric,
        roles: &[EquivalenceNumeric, PretestCovariate],
    },
    VariableSpec {
        name: "fear_vas_4cm",
        display_name: "Fear at 4cm (VAS)",
        kind: Numeric,
        roles: &[PretestCovariate, PostTestOutcome],
    },
    VariableSpec {
        name: "fear_scale_4cm",
        display_name: "Fear at 4cm (Scale)",
        kind: Numeric,
        roles: &[PretestCovariate, PostTestOutcome],
    },
    VariableSpec {
        name: "fear_vas_8cm",
        display_name: "Fear at 8cm (VAS)",
        kind: Numeric,
        roles: &[PostTestOutcome],
    },
    VariableSpec {
        name: "fear_scale_8cm",
        display_name: "Fear at 8cm (Scale)",
        kind: Numeric,
        roles: &[PostTestOutcome],
    },
    VariableSpec {
        name: "anxiety_oxford_baseline",
        display_name: "Baseline Anxiety (Oxford)",
        kind: Numeric,
        roles: &[EquivalenceNumeric, PretestCovariate],
    },
    VariableSpec {
        name: "anxiety_oxford_posttest",
        display_name: "Post-test Anxiety (Oxford)",
        kind: Numeric,
        roles: &[PostTestOutcome],
    },
    VariableSpec { name: GROUP_COLUMN, display_name: "Group", kind: Categorical, roles: &[Group] },
    VariableSpec {
        name: "education",
        display_name: "Education",
        kind: Categorical,
        roles: &[EquivalenceCategoric],
    },
    VariableSpec {
        name: "labor_onset",
        display_name: "Labor Onset",
        kind: Categorical,
        roles: &[EquivalenceCategoric],
    },
    VariableSpec {
        name: "marital_status",
        display_name: "Marital Status",
        kind: Categorical,
        roles: &[EquivalenceCategoric],
    },
    VariableSpec {
        name: "income_level",
        display_name: "Income Level",
        kind: Categorical,
        roles: &[EquivalenceCategoric],
    },
    VariableSpec {
        name: "employment_status",
        display_name: "Employment Status",
        kind: Categorical,
        roles: &[EquivalenceCategoric],
    },
    VariableSpec {
        name: "planned_pregnancy",
        display_name: "Planned Pregnancy",
        kind: Categorical,
        roles: &[EquivalenceCategoric],
    },
];

/// The five fixed hypotheses, in report order.
pub const HYPOTHESES: [HypothesisSpec; 5] = [
    HypothesisSpec {
        id: "H1a",
        label: "Latent-phase fear (VAS)",
        outcome: "fear_vas_4cm",
        pretest: "fear_vas_baseline",
    },
    HypothesisSpec {
        id: "H1b",
        label: "Latent-phase fear (Scale)",
        outcome: "fear_scale_4cm",
        pretest: "fear_scale_baseline",
    },
    HypothesisSpec {
        id: "H2a",
        label: "Active-phase fear (VAS)",
        outcome: "fear_vas_8cm",
        pretest: "fear_vas_4cm",
    },
    HypothesisSpec {
        id: "H2b",
        label: "Active-phase fear (Scale)",
        outcome: "fear_scale_8cm",
        pretest: "fear_scale_4cm",
    },
    HypothesisSpec {
        id: "H3",
        label: "Anxiety (Oxford)",
        outcome: "anxiety_oxford_posttest",
        pretest: "anxiety_oxford_baseline",
    },
];

/// Required column names in template order.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    STUDY_VARIABLES.iter().map(|v| v.name)
}

/// Variables of the given kind, in template order.
pub fn variables_of_kind(kind: VariableKind) -> impl Iterator<Item = &'static VariableSpec> {
    STUDY_VARIABLES.iter().filter(move |v| v.kind == kind)
}

/// Variables carrying the given role, in template order.
pub fn variables_with_role(role: VariableRole) -> impl Iterator<Item = &'static VariableSpec> {
    STUDY_VARIABLES.iter().filter(move |v| v.has_role(role))
}

/// Baseline variables in equivalence iteration order: numeric first, then categoric.
pub fn equivalence_variables() -> impl Iterator<Item = &'static VariableSpec> {
    variables_with_role(EquivalenceNumeric).chain(variables_with_role(EquivalenceCategoric))
}

/// Look up a variable by column name.
pub fn variable(name: &str) -> Option<&'static VariableSpec> {
    STUDY_VARIABLES.iter().find(|v| v.name == name)
}

/// Look up a variable by display name.
pub fn variable_by_display_name(display_name: &str) -> Option<&'static VariableSpec> {
    STUDY_VARIABLES.iter().find(|v| v.display_name == display_name)
}

/// Protocol guide: the group column, every variable with its roles, and the hypotheses.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaGuide {
    /// Guide schema tag.
    pub schema_version: &'static str,
    /// Name of the group column.
    pub group_column: &'static str,
    /// Every required variable in template order.
    pub variables: &'static [VariableSpec],
    /// The fixed hypotheses with their base relations.
    pub hypotheses: Vec<HypothesisGuide>,
}

/// One hypothesis as listed in the guide.
#[derive(Debug, Clone, Serialize)]
pub struct HypothesisGuide {
    /// The hypothesis.
    #[serde(flatten)]
    pub spec: HypothesisSpec,
    /// Base relation without dynamic covariates.
    pub formula: String,
}

/// Build the protocol guide.
pub fn guide() -> SchemaGuide {
    SchemaGuide {
        schema_version: "trialstat_schema_v0",
        group_column: GROUP_COLUMN,
        variables: &STUDY_VARIABLES,
        hypotheses: HYPOTHESES
            .iter()
            .map(|h| HypothesisGuide { spec: *h, formula: h.base_formula() })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_schema_shape() {
        assert_eq!(variables_of_kind(VariableKind::Numeric).count(), 10);
        assert_eq!(variables_of_kind(VariableKind::Categorical).count(), 7);
        let names: HashSet<_> = required_columns().collect();
        assert_eq!(names.len(), 17, "column names must be unique");
        let displays: HashSet<_> = STUDY_VARIABLES.iter().map(|v| v.display_name).collect();
        assert_eq!(displays.len(), 17, "display names must be unique");
    }

    #[test]
    fn test_equivalence_order_numeric_first() {
        let order: Vec<_> = equivalence_variables().map(|v| v.name).collect();
        assert_eq!(
            order,
            vec![
                "age",
                "gestational_week",
                "fear_vas_baseline",
                "fear_scale_baseline",
                "anxiety_oxford_baseline",
                "education",
                "labor_onset",
                "marital_status",
                "income_level",
                "employment_status",
                "planned_pregnancy",
            ]
        );
    }

    #[test]
    fn test_hypotheses_reference_schema_columns() {
        for h in &HYPOTHESES {
            let outcome = variable(h.outcome).unwrap();
            let pretest = variable(h.pretest).unwrap();
            assert!(outcome.has_role(VariableRole::PostTestOutcome), "{}", h.id);
            assert!(pretest.has_role(VariableRole::PretestCovariate), "{}", h.id);
        }
        assert_eq!(HYPOTHESES[2].base_formula(), "fear_vas_8cm ~ group + fear_vas_4cm");
    }

    #[test]
    fn test_guide_lists_everything() {
        let g = guide();
        assert_eq!(g.variables.len(), 17);
        assert_eq!(g.hypotheses.len(), 5);
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["variables"][2]["roles"][1], "pretest_covariate");
        assert_eq!(v["hypotheses"][4]["id"], "H3");
        assert_eq!(
            v["hypotheses"][4]["formula"],
            "anxiety_oxford_posttest ~ group + anxiety_oxford_baseline"
        );
    }

    #[test]
    fn test_display_lookup_round_trips() {
        let age = variable_by_display_name("Age").unwrap();
        assert_eq!(age.name, "age");
        assert!(variable_by_display_name("age").is_none());
    }
}
