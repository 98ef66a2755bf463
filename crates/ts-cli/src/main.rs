//! TrialStat CLI

mod io;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ts_core::{AnalysisConfig, AnalysisReport, Dataset, ReportError};
use ts_viz::ChartSet;

#[derive(Parser)]
#[command(name = "trialstat")]
#[command(about = "TrialStat - two-phase analysis of two-arm intervention studies")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the empty CSV template (header row only)
    Template {
        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Describe the study schema and hypothesis formulas (JSON)
    Schema {
        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run phase 1, the dynamic correction and phase 2 on a filled template
    Analyze {
        /// Input CSV (filled template)
        #[arg(short, long)]
        input: PathBuf,

        /// Analysis config (YAML, or JSON with a `.json` extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ReportFormat,
    },

    /// Build the chart battery as numbers-first JSON artifacts
    Charts {
        /// Input CSV (filled template)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the full report bundle (JSON, charts, Markdown, manifest) into a directory
    Report {
        /// Input CSV (filled template)
        #[arg(short, long)]
        input: PathBuf,

        /// Analysis config (YAML, or JSON with a `.json` extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory (created if missing)
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON report; logs go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Template { output } => cmd_template(output.as_ref()),
        Commands::Schema { output } => cmd_schema(output.as_ref()),
        Commands::Analyze { input, config, output, format } => {
            cmd_analyze(&input, config.as_ref(), output.as_ref(), format)
        }
        Commands::Charts { input, output } => cmd_charts(&input, output.as_ref()),
        Commands::Report { input, config, out_dir } => {
            cmd_report(&input, config.as_ref(), &out_dir)
        }
        Commands::Version => {
            println!("trialstat {}", ts_core::VERSION);
            Ok(())
        }
    }
}

/// Analysis report plus chart set; charts are only built for a completed analysis.
fn run_pipeline(dataset: &Dataset, cfg: &AnalysisConfig) -> (AnalysisReport, Option<ChartSet>) {
    let clean = match ts_inference::validate(dataset) {
        Ok(clean) => clean,
        Err(err) => {
            tracing::warn!("validation failed: {err}");
            return (AnalysisReport::Failed { error: ReportError::from(&err) }, None);
        }
    };
    let analysis = AnalysisReport::from(ts_inference::analyze_clean(&clean, cfg));
    if let Some(err) = analysis.error() {
        tracing::warn!("analysis failed: {}", err.message);
        return (analysis, None);
    }
    (analysis, Some(ts_viz::build_chart_set(&clean)))
}

fn bail_if_failed(report: &AnalysisReport) -> Result<()> {
    if let Some(err) = report.error() {
        anyhow::bail!("analysis failed ({}): {}", err.kind, err.message);
    }
    Ok(())
}

fn cmd_template(output: Option<&PathBuf>) -> Result<()> {
    io::write_text(output, &ts_core::dataset::template_csv()?)
}

fn cmd_schema(output: Option<&PathBuf>) -> Result<()> {
    io::write_json(output, serde_json::to_value(ts_core::schema::guide())?)
}

fn cmd_analyze(
    input: &PathBuf,
    config: Option<&PathBuf>,
    output: Option<&PathBuf>,
    format: ReportFormat,
) -> Result<()> {
    let cfg = io::read_config(config.map(|p| p.as_path()))?;
    let dataset = io::load_dataset(input)?;
    let analysis = ts_inference::analyze(&dataset, &cfg);
    match format {
        ReportFormat::Json => io::write_json(output, serde_json::to_value(&analysis)?)?,
        ReportFormat::Markdown => {
            io::write_text(output, &report::render_markdown(&analysis, None, &cfg))?
        }
    }
    bail_if_failed(&analysis)
}

fn cmd_charts(input: &PathBuf, output: Option<&PathBuf>) -> Result<()> {
    let dataset = io::load_dataset(input)?;
    let clean = ts_inference::validate(&dataset)?;
    let charts = ts_viz::build_chart_set(&clean);
    let n_failed = charts.failures().count();
    if n_failed > 0 {
        tracing::warn!("{n_failed} chart(s) could not be rendered");
    }
    io::write_json(output, serde_json::to_value(&charts)?)
}

fn cmd_report(input: &PathBuf, config: Option<&PathBuf>, out_dir: &PathBuf) -> Result<()> {
    let cfg = io::read_config(config.map(|p| p.as_path()))?;
    let dataset = io::load_dataset(input)?;
    let (analysis, charts) = run_pipeline(&dataset, &cfg);
    report::write_bundle(out_dir, input, &analysis, charts.as_ref(), &cfg)?;
    tracing::info!(out_dir = %out_dir.display(), "report bundle written");
    bail_if_failed(&analysis)
}
