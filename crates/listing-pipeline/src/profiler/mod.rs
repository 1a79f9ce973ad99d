//! Exploration statistics used to narrate the pipeline.
//!
//! Value counts, integer summaries and date distributions. These functions
//! only read the table.

mod counts;
mod dates;
mod statistics;

pub use counts::{ValueCount, value_counts, value_counts_by_value};
pub use dates::{DateDistribution, DateShare, MISSING_DATE, date_distribution};
pub use statistics::{NumericSummary, describe_integers};
