use log::{debug, warn};

use crate::table::ResponseTable;

/// Labels of the five fixed effort bands partitioning [0, 100].
pub const BAND_LABELS: [&str; 5] = ["0–20%", "20–40%", "40–60%", "60–80%", "80–100%"];

/// The nine taxa groups of the effort question, in canonical order.
pub const TAXON_LABELS: [&str; 9] = [
    "Terrestrial Plants",
    "Terrestrial Invertebrates",
    "Terrestrial Vertebrates",
    "Freshwater Plants",
    "Freshwater Invertebrates",
    "Freshwater Vertebrates",
    "Marine Plants",
    "Marine Invertebrates",
    "Marine Vertebrates",
];

/// Map a percentage value to its band index. Bands are half-open
/// [0,20) [20,40) [40,60) [60,80), except the last which is the closed
/// [80,100] so that 100 has a home. Values outside [0,100] are invalid
/// survey entries and belong to no band.
pub fn band_index(value: f64) -> Option<usize> {
    if !(0.0..=100.0).contains(&value) {
        return None;
    }
    if value == 100.0 {
        return Some(4);
    }
    Some((value / 20.0).floor() as usize)
}

/// How effort columns are located in the table: an optional question
/// marker narrows the candidate headers, then each taxon binds to the one
/// candidate containing its keyword. Column order is never trusted.
#[derive(Debug, Clone)]
pub struct TaxonMap {
    pub marker: Option<String>,
    /// (taxon label, required keyword substring), in output order.
    pub keywords: Vec<(String, String)>,
}

impl Default for TaxonMap {
    fn default() -> Self {
        TaxonMap {
            marker: Some("Identify the percentage of your effort".to_string()),
            keywords: TAXON_LABELS
                .iter()
                .map(|l| (l.to_string(), l.to_string()))
                .collect(),
        }
    }
}

/// The banded effort distribution for one resolved taxon group. Dense:
/// all five bands are present, zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedCategory {
    pub label: String,
    pub column: String,
    pub counts: [usize; 5],
}

impl BandedCategory {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Each band's share of this category's own total, for in-bar
    /// annotations. `None` when the category has no counted values, so a
    /// zero total never turns into NaN downstream.
    pub fn shares(&self) -> Option<[f64; 5]> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut shares = [0.0; 5];
        for (i, &c) in self.counts.iter().enumerate() {
            shares[i] = c as f64 / total as f64 * 100.0;
        }
        Some(shares)
    }
}

/// Bin every taxon's effort column into the five fixed bands.
///
/// Taxa whose column cannot be resolved unambiguously are omitted with a
/// warning; cells that are missing, non-numeric, or outside [0,100] are
/// skipped per cell and never fail the call.
pub fn banded_summary(table: &ResponseTable, map: &TaxonMap) -> Vec<BandedCategory> {
    let mut result = Vec::new();

    for (label, keyword) in &map.keywords {
        let column = match resolve_taxon_column(table, map.marker.as_deref(), keyword) {
            Some(c) => c,
            None => {
                warn!("no unambiguous column for taxon '{}', omitting", label);
                continue;
            }
        };

        let mut counts = [0usize; 5];
        // Resolution only returns existing headers, so the lookup cannot fail.
        if let Ok(cells) = table.column(&column) {
            for cell in cells {
                let value = match cell.as_number() {
                    Some(v) => v,
                    None => continue,
                };
                match band_index(value) {
                    Some(band) => counts[band] += 1,
                    None => debug!("value {} in '{}' outside [0,100], skipped", value, column),
                }
            }
        }

        result.push(BandedCategory {
            label: label.clone(),
            column,
            counts,
        });
    }

    result
}

/// Find the single header that contains `keyword` (and the question marker,
/// when one is configured). Zero or multiple matches resolve to nothing.
fn resolve_taxon_column(
    table: &ResponseTable,
    marker: Option<&str>,
    keyword: &str,
) -> Option<String> {
    let mut matches = table.headers().iter().filter(|h| {
        marker.map_or(true, |m| h.contains(m)) && h.contains(keyword)
    });

    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.clone())
}
