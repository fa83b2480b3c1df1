use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::table::{Cell, ResponseTable};

/// Columns to strip from a dataset before it is exposed to any selection
/// or aggregation. The exact list varies between survey exports, so it is
/// external configuration; the default covers the identity and free-text
/// demographic fields seen so far.
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionConfig {
    pub drop_columns: Vec<String>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        RedactionConfig {
            drop_columns: [
                "Name",
                "Username",
                "Email",
                "Email Address",
                "IP Address",
                "What is your race/ethnicity?",
                "What is your gender?",
                "What is your highest level of education?",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RedactionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read redaction config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid redaction config '{}'", path.display()))
    }
}

/// Load a survey CSV into a redacted `ResponseTable`. Redaction happens
/// here, once, before any column name leaves this function.
pub fn load_table(path: &Path, redaction: &RedactionConfig) -> Result<ResponseTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read CSV record {}", i + 1))?;
        rows.push(record.iter().map(Cell::from_raw).collect());
    }

    let table = ResponseTable::new(headers, rows)?;
    let before = table.headers().len();
    let table = table.drop_columns(&redaction.drop_columns);

    info!(
        "loaded '{}': {} rows, {} columns ({} redacted)",
        path.display(),
        table.row_count(),
        table.headers().len(),
        before - table.headers().len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("surveybar_loader_{}", name));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_table_redacts_default_columns() {
        let path = write_temp_csv(
            "redact.csv",
            "Email,Pref\na@b.c,\"A, B\"\n,B\n",
        );
        let table = load_table(&path, &RedactionConfig::default()).unwrap();
        assert_eq!(table.headers(), &["Pref".to_string()]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_load_table_normalizes_cells() {
        // The csv reader never delivers fully blank lines, so missingness
        // is exercised through an NA marker and an empty field.
        let path = write_temp_csv("cells.csv", "Score,Note\n 10 ,ok\nNA,\nnot a number,ok\n");
        let table = load_table(&path, &RedactionConfig { drop_columns: vec![] }).unwrap();
        let cells: Vec<_> = table.column("Score").unwrap().collect();
        assert_eq!(cells[0].as_number(), Some(10.0));
        assert!(cells[1].is_missing());
        assert_eq!(cells[2].as_text(), Some("not a number"));

        let notes: Vec<_> = table.column("Note").unwrap().collect();
        assert!(notes[1].is_missing());
    }

    #[test]
    fn test_load_table_missing_file() {
        let result = load_table(
            Path::new("/nonexistent/survey.csv"),
            &RedactionConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_redaction_config_from_json() {
        let path = write_temp_csv("config.json", r#"{"drop_columns": ["IP Address"]}"#);
        let config = RedactionConfig::from_file(&path).unwrap();
        assert_eq!(config.drop_columns, vec!["IP Address"]);
    }
}
