use crate::error::SurveyError;
use crate::table::ResponseTable;

/// Flatten one column of survey answers into individual response tokens.
///
/// Multi-select answers arrive as comma-separated strings ("A, B"), so a
/// single row can contribute several tokens. Missing cells contribute
/// none. Token order is input-row order, then intra-cell split order.
pub fn normalize(table: &ResponseTable, column: &str) -> Result<Vec<String>, SurveyError> {
    let mut tokens = Vec::new();
    for cell in table.column(column)? {
        if let Some(text) = cell.as_text() {
            tokens.extend(split_tokens(text));
        }
    }
    Ok(tokens)
}

/// Split a present cell value on commas, trimming each piece and dropping
/// pieces that trim to nothing (e.g. a trailing comma).
pub fn split_tokens(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
