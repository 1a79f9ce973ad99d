use crate::aggregate::GroupedMeans;
use crate::config::RangeBounds;
use crate::profiler::{DateDistribution, NumericSummary, ValueCount};
use crate::reporting::BrandComparison;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Cleaned listings plus everything learned while producing them.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Renamed, pruned, coerced and filtered table.
    pub listings: DataFrame,
    pub report: ListingReport,
}

/// Rows and columns of a table at one point in the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
}

impl TableShape {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            rows: df.height(),
            columns: df.width(),
        }
    }
}

/// Outcome of one range filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub column: String,
    pub bounds: RangeBounds,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Share of non-null values outside `bounds` before filtering.
    pub share_outside: f64,
}

impl FilterOutcome {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }

    /// Fraction of rows removed (0.0 - 1.0).
    pub fn removed_fraction(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            self.rows_removed() as f64 / self.rows_before as f64
        }
    }
}

/// Value counts of a column taken just before it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedColumn {
    pub name: String,
    pub value_counts: Vec<ValueCount>,
}

/// Findings recorded at each stage of a run.
///
/// Field order follows the order in which the pipeline records them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingReport {
    pub loaded: TableShape,
    pub column_names: Vec<String>,
    pub dropped_columns: Vec<DroppedColumn>,
    pub price_summary: Option<NumericSummary>,
    pub mileage_summary: Option<NumericSummary>,
    /// Mileage value counts ordered by mileage, taken before any filter.
    pub mileage_counts: Vec<ValueCount>,
    /// Least expensive prices with their counts, lowest first.
    pub lowest_prices: Vec<ValueCount>,
    /// Most expensive prices with their counts, highest first.
    pub highest_prices: Vec<ValueCount>,
    pub price_filter: Option<FilterOutcome>,
    pub date_distributions: Vec<DateDistribution>,
    pub registration_year_summary: Option<NumericSummary>,
    pub registration_year_filter: Option<FilterOutcome>,
    /// Registration year shares after filtering, most frequent first.
    pub registration_year_shares: Vec<ValueCount>,
    pub brand_counts: Vec<ValueCount>,
    pub top_brand_prices: GroupedMeans,
    pub bottom_brand_prices: GroupedMeans,
    pub top_brand_mileage: GroupedMeans,
    pub brand_comparison: BrandComparison,
    pub cleaned: TableShape,
}
