use crate::error::SurveyError;

/// A single cell value, tagged at table-construction time so downstream
/// code never re-checks missingness or numeric-ness ad hoc.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Trimmed, non-empty, non-numeric text.
    Text(String),
    /// Numeric cell: parsed value plus the original trimmed text, so the
    /// cell still compares and displays exactly as it was typed.
    Number { raw: String, value: f64 },
    Missing,
}

impl Cell {
    /// Normalize one raw CSV field. Empty strings and the common NA
    /// markers become `Missing`; anything parseable as f64 is `Number`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("n/a") {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number {
                raw: trimmed.to_string(),
                value,
            },
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    /// Textual view of a present cell; numbers render as their raw text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number { raw, .. } => Some(raw),
            Cell::Missing => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// An immutable rectangular survey dataset: ordered named columns over
/// row-major cells. Built once by the loader; aggregators only derive
/// views from it.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl ResponseTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, SurveyError> {
        let expected = headers.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(SurveyError::RaggedRow {
                    row: i + 1,
                    got: row.len(),
                    expected,
                });
            }
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Resolve a column name to its index, case-insensitively (header rows
    /// in the survey exports are not consistently cased).
    pub fn column_index(&self, name: &str) -> Result<usize, SurveyError> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| SurveyError::ColumnNotFound(name.to_string()))
    }

    /// Iterate the cells of one column in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell>, SurveyError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Sorted distinct present values of a column. This is the option
    /// list a caller offers for filtering, so missing cells are dropped.
    pub fn unique_values(&self, name: &str) -> Result<Vec<String>, SurveyError> {
        let mut values: Vec<String> = self
            .column(name)?
            .filter_map(|c| c.as_text())
            .map(|s| s.to_string())
            .collect();
        sort_values(&mut values);
        values.dedup();
        Ok(values)
    }

    /// Return a copy of the table with the named columns removed.
    /// Names that do not occur are ignored; matching is case-insensitive.
    pub fn drop_columns(&self, names: &[String]) -> ResponseTable {
        let keep: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !names.iter().any(|n| h.eq_ignore_ascii_case(n)))
            .map(|(i, _)| i)
            .collect();

        let headers = keep.iter().map(|&i| self.headers[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect();

        // Unchecked construction is fine: projecting columns keeps rows
        // rectangular.
        ResponseTable { headers, rows }
    }
}

/// Sort value labels for display: numerically when every label parses as
/// a number ("2" before "10"), lexicographically otherwise.
pub fn sort_values(values: &mut [String]) {
    let all_numeric = values.iter().all(|s| s.parse::<f64>().is_ok());
    if all_numeric {
        values.sort_by(|a, b| {
            let fa = a.parse::<f64>().unwrap();
            let fb = b.parse::<f64>().unwrap();
            fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        values.sort();
    }
}
