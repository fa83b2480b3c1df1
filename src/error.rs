use thiserror::Error;

/// Errors raised by the aggregation core.
///
/// An empty count table is deliberately *not* an error: callers get back
/// empty collections and decide how to present "no data".
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("column '{0}' not found in table")]
    ColumnNotFound(String),

    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
}
