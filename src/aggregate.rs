use std::collections::{HashMap, HashSet};

use crate::error::SurveyError;
use crate::normalize::split_tokens;
use crate::table::{sort_values, ResponseTable};

/// Count occurrences of each distinct token. Sparse: categories that never
/// occur have no entry. Display order is left to the caller.
pub fn count(tokens: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

/// Chart-friendly ordering of a 1-D count table: count descending, label
/// ascending on ties.
pub fn count_sorted(counts: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// One category row of a cross-tab, with counts aligned to
/// `Crosstab::group_values` and zero-filled for unobserved combinations.
#[derive(Debug, Clone, PartialEq)]
pub struct CrosstabRow {
    pub category: String,
    pub counts: Vec<usize>,
}

impl CrosstabRow {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// A dense two-dimensional count table: response category by grouping
/// value. Group values are sorted; category rows are ordered by total
/// (descending) so stacked charts read largest-first.
#[derive(Debug, Clone, Default)]
pub struct Crosstab {
    pub group_values: Vec<String>,
    pub rows: Vec<CrosstabRow>,
}

impl Crosstab {
    /// True when no row survived normalization and filtering. A valid
    /// terminal state ("no data to display"), not an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cross-tabulate a multi-select primary column against a grouping column.
///
/// The primary column goes through multi-select splitting; the grouping
/// value is compared as a single trimmed string. Rows where either cell is
/// missing are excluded. A non-empty `allowed` set restricts which group
/// values contribute; an empty set means no filtering.
pub fn crosstab(
    table: &ResponseTable,
    primary: &str,
    grouping: &str,
    allowed: &HashSet<String>,
) -> Result<Crosstab, SurveyError> {
    let primary_idx = table.column_index(primary)?;
    let grouping_idx = table.column_index(grouping)?;

    let mut cells: HashMap<String, HashMap<String, usize>> = HashMap::new();
    let mut observed_groups: HashSet<String> = HashSet::new();

    for row in table.rows() {
        let group = match row[grouping_idx].as_text() {
            Some(g) => g,
            None => continue,
        };
        let value = match row[primary_idx].as_text() {
            Some(v) => v,
            None => continue,
        };
        if !allowed.is_empty() && !allowed.contains(group) {
            continue;
        }

        for token in split_tokens(value) {
            *cells
                .entry(token)
                .or_default()
                .entry(group.to_string())
                .or_insert(0) += 1;
            observed_groups.insert(group.to_string());
        }
    }

    let mut group_values: Vec<String> = observed_groups.into_iter().collect();
    sort_values(&mut group_values);
    let mut rows: Vec<CrosstabRow> = cells
        .into_iter()
        .map(|(category, by_group)| CrosstabRow {
            counts: group_values
                .iter()
                .map(|g| by_group.get(g).copied().unwrap_or(0))
                .collect(),
            category,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total()
            .cmp(&a.total())
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(Crosstab { group_values, rows })
}
