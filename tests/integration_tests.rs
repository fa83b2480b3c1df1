use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Helper to run the surveybar binary with the given arguments.
fn run_surveybar(args: &[&str]) -> Result<String, String> {
    let output = Command::new("cargo")
        .args(["run", "--bin", "surveybar", "--"])
        .args(args)
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && &bytes[0..8] == &[137, 80, 78, 71, 13, 10, 26, 10]
}

fn temp_png(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("surveybar_it_{}.png", name))
}

#[test]
fn test_columns_redacts_email() {
    let out = run_surveybar(&["columns", "--data", "tests/data/survey.csv"]).unwrap();
    let columns: Vec<&str> = out.lines().collect();
    assert!(columns.contains(&"Pref"));
    assert!(columns.contains(&"Role"));
    assert!(!columns.contains(&"Email"));
}

#[test]
fn test_columns_with_redaction_override() {
    let out = run_surveybar(&[
        "columns",
        "--data",
        "tests/data/survey.csv",
        "--redact",
        "tests/data/redact.json",
    ])
    .unwrap();
    assert_eq!(out.lines().collect::<Vec<_>>(), vec!["Pref"]);
}

#[test]
fn test_values_sorted_without_missing() {
    let out = run_surveybar(&[
        "values",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Role",
    ])
    .unwrap();
    assert_eq!(out.lines().collect::<Vec<_>>(), vec!["X", "Y"]);
}

#[test]
fn test_counts_splits_multiselect() {
    let out = run_surveybar(&[
        "counts",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Pref",
    ])
    .unwrap();
    assert!(out.contains("A\t2"));
    assert!(out.contains("B\t2"));
}

#[test]
fn test_counts_json_output() {
    let out = run_surveybar(&[
        "counts",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Pref",
        "--json",
    ])
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).expect("not valid JSON");
    assert_eq!(value["A"], 2);
    assert_eq!(value["B"], 2);
}

#[test]
fn test_counts_grouped_with_keep_filter() {
    // Only row 1 has a present Pref and Role == X.
    let out = run_surveybar(&[
        "counts",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Pref",
        "--group-by",
        "Role",
        "--keep",
        "X",
    ])
    .unwrap();
    assert!(out.contains("A\t1"));
    assert!(out.contains("B\t1"));
    assert!(!out.contains("Y"));
}

#[test]
fn test_counts_filtered_to_nothing_reports_no_data() {
    let out = run_surveybar(&[
        "counts",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Pref",
        "--group-by",
        "Role",
        "--keep",
        "Z",
    ])
    .unwrap();
    assert!(out.contains("no data to display"));
}

#[test]
fn test_counts_column_not_found() {
    let result = run_surveybar(&[
        "counts",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Nope",
    ]);
    assert!(result.is_err(), "Should have failed with column not found");
    assert!(result.unwrap_err().contains("not found"));
}

#[test]
fn test_chart_writes_png() {
    let output = temp_png("bar");
    run_surveybar(&[
        "chart",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Pref",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let bytes = fs::read(&output).expect("PNG not written");
    assert!(is_valid_png(&bytes), "Output is not a valid PNG");
}

#[test]
fn test_chart_grouped_stacked_png() {
    let output = temp_png("stacked");
    run_surveybar(&[
        "chart",
        "--data",
        "tests/data/survey.csv",
        "--column",
        "Pref",
        "--group-by",
        "Role",
        "--title",
        "Preferences by role",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let bytes = fs::read(&output).expect("PNG not written");
    assert!(is_valid_png(&bytes));
}

#[test]
fn test_effort_prints_all_nine_taxa() {
    let out = run_surveybar(&["effort", "--data", "tests/data/effort.csv"]).unwrap();
    for taxon in [
        "Terrestrial Plants",
        "Terrestrial Invertebrates",
        "Terrestrial Vertebrates",
        "Freshwater Plants",
        "Freshwater Invertebrates",
        "Freshwater Vertebrates",
        "Marine Plants",
        "Marine Invertebrates",
        "Marine Vertebrates",
    ] {
        assert!(out.contains(taxon), "missing taxon '{}'", taxon);
    }
}

#[test]
fn test_effort_excludes_out_of_range_values() {
    let out = run_surveybar(&["effort", "--data", "tests/data/effort.csv"]).unwrap();
    // Terrestrial Plants column is [5, 15, 150]: 150 is excluded, so the
    // first band holds 2 and the rest 0.
    let line = out
        .lines()
        .find(|l| l.starts_with("Terrestrial Plants"))
        .unwrap();
    assert!(line.contains("2\t0\t0\t0\t0"));
}

#[test]
fn test_effort_chart_png_with_annotations() {
    let output = temp_png("effort");
    run_surveybar(&[
        "effort",
        "--data",
        "tests/data/effort.csv",
        "--annotate",
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let bytes = fs::read(&output).expect("PNG not written");
    assert!(is_valid_png(&bytes));
}

#[test]
fn test_effort_no_matching_columns_reports_no_data() {
    let out = run_surveybar(&["effort", "--data", "tests/data/survey.csv"]).unwrap();
    assert!(out.contains("no data to display"));
}

#[test]
fn test_missing_data_file_fails() {
    let result = run_surveybar(&["columns", "--data", "tests/data/absent.csv"]);
    assert!(result.is_err(), "Should have failed opening the file");
}
