// Library exports for surveybar

pub mod aggregate;
pub mod banding;
pub mod chart;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod table;

pub use aggregate::{count, count_sorted, crosstab, Crosstab};
pub use banding::{banded_summary, TaxonMap, BAND_LABELS, TAXON_LABELS};
pub use error::SurveyError;
pub use loader::{load_table, RedactionConfig};
pub use normalize::normalize;
pub use table::{Cell, ResponseTable};
