use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_trialstat"))
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

fn tmp_path(suffix: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("trialstat_cli_{}_{}{}", std::process::id(), nanos, suffix))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!("stdout is not JSON ({e}): {}", String::from_utf8_lossy(&out.stdout))
    })
}

#[test]
fn analyze_strong_fixture_completes() {
    let input = fixture_path("trial_strong.csv");
    assert!(input.exists(), "missing fixture: {}", input.display());

    let out = run(&["analyze", "--input", input.to_string_lossy().as_ref()]);
    assert!(
        out.status.success(),
        "analyze should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let v = stdout_json(&out);
    assert_eq!(v["status"], "completed");
    assert_eq!(v["equivalence"]["equivalent"], true);
    assert_eq!(v["equivalence"]["comparisons"].as_array().unwrap().len(), 11);
    assert_eq!(v["correction"]["terms"].as_array().unwrap().len(), 0);
    assert_eq!(v["narrative"]["category"], "strong_positive");

    let outcomes = v["hypotheses"]["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 5);
    for o in outcomes {
        assert_eq!(o["status"], "fitted", "{o}");
        assert_eq!(o["supported"], true, "{o}");
        assert!(o["p_value"].as_f64().unwrap() < 0.05, "{o}");
    }
}

#[test]
fn analyze_age_imbalance_applies_correction() {
    let input = fixture_path("trial_age_imbalance.csv");
    let out = run(&["analyze", "--input", input.to_string_lossy().as_ref()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let v = stdout_json(&out);
    assert_eq!(v["equivalence"]["failing"], serde_json::json!(["Age"]));
    assert_eq!(v["correction"]["formula"], " + age");
    assert_eq!(v["narrative"]["category"], "corrected_positive");
    for o in v["hypotheses"]["outcomes"].as_array().unwrap() {
        assert!(o["formula"].as_str().unwrap().ends_with(" + age"), "{o}");
    }
}

#[test]
fn analyze_placeholder_data_fails_with_report() {
    let input = fixture_path("trial_unknown_numeric.csv");
    let out = run(&["analyze", "--input", input.to_string_lossy().as_ref()]);
    assert!(!out.status.success(), "placeholder-only data must exit non-zero");

    // The failed report is still written before exiting.
    let v = stdout_json(&out);
    assert_eq!(v["status"], "failed");
    assert_eq!(v["error"]["kind"], "empty_numeric_data");
    assert!(v.get("equivalence").is_none());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("empty_numeric_data"), "stderr={stderr}");
}

#[test]
fn analyze_non_template_csv_names_missing_columns() {
    let input = tmp_path(".csv");
    std::fs::write(&input, "age,group\n31,Control\n29,Intervention\n").unwrap();

    let out = run(&["analyze", "--input", input.to_string_lossy().as_ref()]);
    assert!(!out.status.success());
    let v = stdout_json(&out);
    assert_eq!(v["error"]["kind"], "missing_columns");
    let msg = v["error"]["message"].as_str().unwrap();
    assert!(msg.contains("gestational_week"), "{msg}");
    assert!(msg.contains("template"), "{msg}");

    let _ = std::fs::remove_file(&input);
}

#[test]
fn verbose_logs_stay_off_stdout() {
    let input = fixture_path("trial_strong.csv");
    let out = run(&["--log-level", "debug", "analyze", "--input", input.to_string_lossy().as_ref()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let v = stdout_json(&out);
    assert_eq!(v["status"], "completed");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DEBUG"), "stderr={stderr}");
}

#[test]
fn analyze_with_yaml_config_and_markdown_output() {
    let cfg = tmp_path(".yaml");
    std::fs::write(&cfg, "alpha: 0.01\n").unwrap();
    let out_md = tmp_path(".md");
    let input = fixture_path("trial_strong.csv");

    let out = run(&[
        "analyze",
        "--input",
        input.to_string_lossy().as_ref(),
        "--config",
        cfg.to_string_lossy().as_ref(),
        "--format",
        "markdown",
        "--output",
        out_md.to_string_lossy().as_ref(),
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let md = std::fs::read_to_string(&out_md).unwrap();
    assert!(md.starts_with("# TrialStat analysis report"));
    assert!(md.contains("## Phase 1: baseline equivalence"));
    assert!(md.contains("p >= 0.01"), "{md}");
    assert!(md.contains("No correction applied."));
    assert!(md.contains("## Conclusion: Strong positive finding"));
    assert_eq!(md.matches("-> supported").count(), 5, "{md}");

    let _ = std::fs::remove_file(&cfg);
    let _ = std::fs::remove_file(&out_md);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = tmp_path(".json");
    std::fs::write(&cfg, r#"{"alpha": 1.5}"#).unwrap();
    let input = fixture_path("trial_strong.csv");

    let out = run(&[
        "analyze",
        "--input",
        input.to_string_lossy().as_ref(),
        "--config",
        cfg.to_string_lossy().as_ref(),
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("alpha must be in (0, 1)"), "stderr={stderr}");

    let _ = std::fs::remove_file(&cfg);
}
