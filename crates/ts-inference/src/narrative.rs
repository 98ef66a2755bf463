use ts_core::{EquivalenceResult, HypothesisResult, Narrative, NarrativeCategory};

/// Map the phase outcomes to one of the four conclusions.
pub fn classify(phase1_pass: bool, phase2_pass: bool) -> NarrativeCategory {
    match (phase1_pass, phase2_pass) {
        (true, true) => NarrativeCategory::StrongPositive,
        (false, true) => NarrativeCategory::CorrectedPositive,
        (true, false) => NarrativeCategory::Neutral,
        (false, false) => NarrativeCategory::Inconclusive,
    }
}

fn template(category: NarrativeCategory, failing: &[String]) -> String {
    match category {
        NarrativeCategory::StrongPositive => "The groups were fully equivalent at baseline \
            (Phase 1). The hypothesis tests (Phase 2) confirmed a significant reduction in fear \
            and/or anxiety in the intervention group. These findings strongly support a \
            significant, positive effect of the intervention on the outcomes targeted by the \
            protocol."
            .to_string(),
        NarrativeCategory::CorrectedPositive => format!(
            "Although the hypotheses (Phase 2) favour the intervention, baseline equivalence \
             failed (Phase 1) on: {}. These confounding variables were added to the Phase 2 \
             ANCOVA models automatically so that their effect is controlled for. The corrected \
             results support a positive effect of the intervention despite the baseline \
             differences.",
            failing.join(", ")
        ),
        NarrativeCategory::Neutral => "The groups were fully equivalent at baseline (Phase 1), \
            but the hypothesis tests (Phase 2) found no statistically significant difference \
            between the groups. Under the conditions and sample of this study the intervention \
            had no measurable effect."
            .to_string(),
        NarrativeCategory::Inconclusive => "Baseline equivalence failed (Phase 1) and the \
            hypothesis tests (Phase 2) found no significant effect. Because of the baseline \
            differences and the absence of an effect, the results of this study should be \
            considered inconclusive."
            .to_string(),
    }
}

/// Classify the analysis and render the fixed template of its category.
///
/// Phase 2 passes when any fitted hypothesis is supported; failed fits never count.
pub fn narrate(equivalence: &EquivalenceResult, hypotheses: &HypothesisResult) -> Narrative {
    let category = classify(equivalence.equivalent, hypotheses.any_supported());
    Narrative {
        category,
        title: category.title().to_string(),
        text: template(category, &equivalence.failing),
    }
}
