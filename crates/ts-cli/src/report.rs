//! Markdown report assembly and the `report --out-dir` bundle.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use ts_core::{
    AnalysisConfig, AnalysisReport, AnalysisSummary, BaselineStatistic, HypothesisStatus,
    VariableKind,
};
use ts_viz::ChartSet;

fn fmt_p(p: f64) -> String {
    format!("{p:.6}")
}

fn write_phase1(out: &mut String, s: &AnalysisSummary, cfg: &AnalysisConfig) -> std::fmt::Result {
    writeln!(out, "## Phase 1: baseline equivalence\n")?;
    writeln!(
        out,
        "| Variable | Test | Statistic | {} mean (SD) | {} mean (SD) | p-value | Result |",
        cfg.intervention_label, cfg.control_label
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for c in &s.equivalence.comparisons {
        let (test, stat) = match &c.statistic {
            BaselineStatistic::Welch { t, df } => ("Welch t", format!("t = {t:.3}, df = {df:.1}")),
            BaselineStatistic::ChiSquare { statistic, dof, yates } => (
                if *yates { "Chi-square (Yates)" } else { "Chi-square" },
                format!("X2 = {statistic:.3}, dof = {dof}"),
            ),
            BaselineStatistic::Untestable { reason } => ("not testable", reason.clone()),
        };
        let summary = |cs: &Option<ts_core::CohortSummary>| match cs {
            Some(cs) if cs.n >= 2 => format!("{:.2} ({:.2})", cs.mean, cs.sd),
            Some(cs) => format!("n = {}", cs.n),
            None => "-".to_string(),
        };
        let (p, result) = match c.p_value {
            Some(p) if cfg.is_significant(p) => (fmt_p(p), "not equivalent"),
            Some(p) => (fmt_p(p), "equivalent"),
            None => ("-".to_string(), "not testable"),
        };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            c.display_name,
            test,
            stat,
            summary(&c.intervention),
            summary(&c.control),
            p,
            result
        )?;
    }
    writeln!(out)?;
    let untestable: Vec<&str> = s.equivalence.untestable().collect();
    if !untestable.is_empty() {
        writeln!(
            out,
            "Not testable (too few values per group), counted as not failing: {}.\n",
            untestable.join(", ")
        )?;
    }
    if s.equivalence.equivalent {
        writeln!(
            out,
            "All {} testable baseline comparisons have p >= {}: the groups are equivalent.\n",
            s.equivalence.comparisons.len() - untestable.len(),
            cfg.alpha
        )
    } else {
        writeln!(
            out,
            "Equivalence failed (p < {}) for: {}.\n",
            cfg.alpha,
            s.equivalence.failing.join(", ")
        )
    }
}

fn write_correction(out: &mut String, s: &AnalysisSummary) -> std::fmt::Result {
    writeln!(out, "## Dynamic correction\n")?;
    if s.correction.is_empty() {
        return writeln!(out, "No correction applied.\n");
    }
    writeln!(out, "Covariates added to every hypothesis model: `{}`\n", s.correction.formula().trim_start_matches(" + "))?;
    for t in s.correction.terms() {
        let kind = match t.kind {
            VariableKind::Numeric => "linear term",
            VariableKind::Categorical => "factor term",
        };
        writeln!(out, "- {} ({})", t.display_name, kind)?;
    }
    writeln!(out)
}

fn write_phase2(out: &mut String, s: &AnalysisSummary) -> std::fmt::Result {
    writeln!(out, "## Phase 2: hypotheses (ANCOVA, type III)\n")?;
    for o in &s.hypotheses.outcomes {
        match &o.status {
            HypothesisStatus::Fitted(fit) => writeln!(
                out,
                "- **{}** {}: `{}`; n = {}, F({}, {}) = {:.3}, p = {} -> {}",
                o.id,
                o.label,
                o.formula,
                fit.n_obs,
                fit.df_num,
                fit.df_den,
                fit.f_statistic,
                fmt_p(fit.p_value),
                if fit.supported { "supported" } else { "not supported" }
            )?,
            HypothesisStatus::Failed { error } => writeln!(
                out,
                "- **{}** {}: `{}`; model could not be fitted: {}",
                o.id, o.label, o.formula, error.message
            )?,
        }
    }
    writeln!(out)
}

fn write_charts(out: &mut String, charts: Option<&ChartSet>) -> std::fmt::Result {
    writeln!(out, "## Appendix: charts\n")?;
    let Some(charts) = charts else {
        return writeln!(out, "Charts were not generated.");
    };
    let rendered: Vec<&str> = charts.rendered().collect();
    if !rendered.is_empty() {
        writeln!(out, "Produced: {}\n", rendered.join(", "))?;
    }
    let failures: Vec<_> = charts.failures().collect();
    if !failures.is_empty() {
        writeln!(out, "Failed:\n")?;
        for (id, err) in failures {
            writeln!(out, "- {}: {}", id, err.message)?;
        }
    }
    Ok(())
}

/// Render the report as Markdown. A failed analysis renders only its error.
pub fn render_markdown(
    report: &AnalysisReport,
    charts: Option<&ChartSet>,
    cfg: &AnalysisConfig,
) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = render_into(&mut out, report, charts, cfg);
    out
}

fn render_into(
    out: &mut String,
    report: &AnalysisReport,
    charts: Option<&ChartSet>,
    cfg: &AnalysisConfig,
) -> std::fmt::Result {
    writeln!(out, "# TrialStat analysis report\n")?;
    let s = match report {
        AnalysisReport::Completed(s) => s,
        AnalysisReport::Failed { error } => {
            writeln!(out, "**Analysis failed** (`{}`)\n", error.kind)?;
            return writeln!(out, "{}", error.message);
        }
    };
    write_phase1(out, s, cfg)?;
    write_correction(out, s)?;
    write_phase2(out, s)?;
    writeln!(out, "## Conclusion: {}\n", s.narrative.title)?;
    writeln!(out, "{}\n", s.narrative.text)?;
    write_charts(out, charts)
}

#[derive(Debug, Clone, Serialize)]
struct Manifest {
    tool: String,
    tool_version: String,
    input_sha256: String,
    status: String,
    files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize)]
struct ManifestFile {
    path: String,
    bytes: u64,
    sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let out = Sha256::digest(bytes);
    let mut s = String::with_capacity(64);
    for b in out {
        let _ = write!(s, "{:02x}", b);
    }
    s
}

/// Write `report.json`, `charts.json` (when charts exist), `report.md` and `manifest.json` into `dir`.
pub fn write_bundle(
    dir: &Path,
    input: &Path,
    report: &AnalysisReport,
    charts: Option<&ChartSet>,
    cfg: &AnalysisConfig,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut files: Vec<(&str, Vec<u8>)> =
        vec![("report.json", serde_json::to_vec_pretty(report)?)];
    if let Some(charts) = charts {
        files.push(("charts.json", serde_json::to_vec_pretty(charts)?));
    }
    files.push(("report.md", render_markdown(report, charts, cfg).into_bytes()));

    let mut manifest = Manifest {
        tool: "trialstat".to_string(),
        tool_version: ts_core::VERSION.to_string(),
        input_sha256: sha256_hex(&std::fs::read(input)?),
        status: if report.summary().is_some() { "completed" } else { "failed" }.to_string(),
        files: Vec::with_capacity(files.len()),
    };
    for (name, bytes) in files {
        std::fs::write(dir.join(name), &bytes)?;
        manifest.files.push(ManifestFile {
            path: name.to_string(),
            bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        });
    }
    std::fs::write(dir.join("manifest.json"), serde_json::to_vec_pretty(&manifest)?)?;
    Ok(())
}
