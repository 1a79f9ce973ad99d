use crate::aggregate::GroupedMeans;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the side-by-side brand table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandComparisonRow {
    pub brand: String,
    pub mean_mileage: i64,
    pub mean_price: i64,
}

/// Mean mileage and mean price per brand, highest mileage first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandComparison {
    pub rows: Vec<BrandComparisonRow>,
}

impl BrandComparison {
    /// Join two aggregator outputs on their categories.
    ///
    /// Rows follow `mean_mileage` sorted by descending mileage; equal
    /// mileages keep their input order. Neither input is modified.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ReportGenerationFailed`] if a brand in `mean_mileage`
    /// has no entry in `mean_prices`.
    pub fn assemble(mean_mileage: &GroupedMeans, mean_prices: &GroupedMeans) -> Result<Self> {
        let mut rows = mean_mileage
            .iter()
            .map(|entry| {
                let mean_price = mean_prices.get(&entry.category).ok_or_else(|| {
                    PipelineError::ReportGenerationFailed(format!(
                        "no mean price for brand '{}'",
                        entry.category
                    ))
                })?;
                Ok(BrandComparisonRow {
                    brand: entry.category.clone(),
                    mean_mileage: entry.mean,
                    mean_price,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        rows.sort_by(|a, b| b.mean_mileage.cmp(&a.mean_mileage));
        Ok(Self { rows })
    }
}

impl fmt::Display for BrandComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16} {:>14} {:>12}", "brand", "mean_mileage", "mean_price")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<16} {:>14} {:>12}",
                row.brand, row.mean_mileage, row.mean_price
            )?;
        }
        Ok(())
    }
}
