use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use ts_core::{AnalysisConfig, Dataset};

/// Read an analysis config from YAML (default) or JSON (`.json`). No path means defaults.
pub fn read_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(AnalysisConfig::default());
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let cfg: AnalysisConfig = if ext == "json" {
        serde_json::from_slice(&bytes)?
    } else {
        serde_yaml_ng::from_slice(&bytes)?
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Load the uploaded CSV.
pub fn load_dataset(input: &Path) -> Result<Dataset> {
    Dataset::from_csv_path(input).with_context(|| format!("load dataset {}", input.display()))
}

pub fn write_text(output: Option<&PathBuf>, text: &str) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    } else {
        print!("{}", text);
    }
    Ok(())
}

pub fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    write_text(output, &format!("{}\n", serde_json::to_string_pretty(&value)?))
}
