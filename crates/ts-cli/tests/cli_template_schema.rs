use std::path::PathBuf;
use std::process::{Command, Output};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_trialstat"))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

#[test]
fn template_is_header_only() {
    let out = run(&["template"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1, "template must carry headers only: {text:?}");

    let headers: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(headers.len(), 17);
    assert_eq!(headers[0], "age");
    assert!(headers.contains(&"group"));
    assert!(headers.contains(&"anxiety_oxford_posttest"));
}

#[test]
fn schema_lists_variables_and_hypotheses() {
    let out = run(&["schema"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

    assert_eq!(v["schema_version"], "trialstat_schema_v0");
    assert_eq!(v["group_column"], "group");
    assert_eq!(v["variables"].as_array().unwrap().len(), 17);

    let hyps = v["hypotheses"].as_array().unwrap();
    assert_eq!(hyps.len(), 5);
    assert_eq!(hyps[0]["id"], "H1a");
    assert_eq!(hyps[0]["formula"], "fear_vas_4cm ~ group + fear_vas_baseline");
}

#[test]
fn version_prints_crate_version() {
    let out = run(&["version"]);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.starts_with("trialstat "), "{text}");
}
