//! The listing pipeline and its builder.

use crate::aggregate::mean_by_category;
use crate::cleaner::{
    coerce_integer_column, drop_column, filter_range, has_column, rename_columns,
    rename_columns_checked, share_outside_range,
};
use crate::config::{ConfigValidationError, PipelineConfig, RangeBounds};
use crate::error::{PipelineError, Result};
use crate::loader::load_listings;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::{
    NumericSummary, date_distribution, describe_integers, value_counts, value_counts_by_value,
};
use crate::reporting::{BrandComparison, tables};
use crate::types::{DroppedColumn, FilterOutcome, ListingReport, PipelineResult, TableShape};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// A filter removing more than this fraction of rows is logged as a warning.
const NOTABLE_LOSS_FRACTION: f64 = 0.05;

/// The listing cleaning pipeline.
///
/// Stages run strictly in order: load, rename, prune, coerce, price filter,
/// date exploration, registration year filter, brand analysis, report.
/// Every stage takes the table from the previous one by value.
///
/// # Example
///
/// ```rust,ignore
/// use listing_pipeline::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .on_progress(|update| println!("{}", update.message))
///     .build()?
///     .run("data/autos.csv")?;
///
/// println!("{}", result.report.brand_comparison);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the listings file at `path` and run every stage over it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        let path = path.as_ref();
        let outcome = self
            .stage(PipelineStage::Loading, || {
                let df = load_listings(path, self.config.encoding)?;
                self.report_progress(ProgressUpdate::new(
                    PipelineStage::Loading,
                    1.0,
                    format!(
                        "Loaded {} listings with {} columns from {}",
                        df.height(),
                        df.width(),
                        path.display()
                    ),
                ));
                Ok(df)
            })
            .and_then(|df| self.process_internal(df));
        self.finish(outcome)
    }

    /// Run every stage after loading over an already loaded table.
    ///
    /// All columns of `df` are expected to hold text, as produced by
    /// [`crate::loader::load_listings`].
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        self.finish(self.process_internal(df))
    }

    fn finish(&self, outcome: Result<PipelineResult>) -> Result<PipelineResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Pipeline completed: {} listings kept",
                    result.listings.height()
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Run `work` as `stage`, attaching the stage name to any error.
    fn stage<T>(&self, stage: PipelineStage, work: impl FnOnce() -> Result<T>) -> Result<T> {
        info!("{}...", stage.display_name());
        work().map_err(|e| e.with_context(stage.display_name()))
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;
        let mut report = ListingReport {
            loaded: TableShape::of(&df),
            ..ListingReport::default()
        };

        let df = self.stage(PipelineStage::Renaming, || {
            let df = if config.validate_source_headers {
                rename_columns_checked(df, &config.columns)?
            } else {
                rename_columns(df, &config.target_names())?
            };
            report.column_names = df
                .get_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::Renaming,
                    1.0,
                    format!("Renamed {} columns", df.width()),
                )
                .with_details(report.column_names.join(", ")),
            );
            Ok(df)
        })?;

        let df = self.stage(PipelineStage::Pruning, || {
            let mut df = df;
            let total = config.drop_columns.len();
            for (index, name) in config.drop_columns.iter().enumerate() {
                if !has_column(&df, name) {
                    return Err(PipelineError::ColumnNotFound(name.clone()));
                }
                let counts = value_counts(df.column(name)?.as_materialized_series())?;
                df = drop_column(df, name)?;
                self.report_progress(
                    ProgressUpdate::with_items(
                        PipelineStage::Pruning,
                        index + 1,
                        total,
                        format!(
                            "Dropped '{}' ({} distinct values)",
                            name,
                            counts.len()
                        ),
                    )
                    .with_details(tables::value_counts_table(&counts)),
                );
                report.dropped_columns.push(DroppedColumn {
                    name: name.clone(),
                    value_counts: counts,
                });
            }
            Ok(df)
        })?;

        let df = self.stage(PipelineStage::Coercion, || {
            let mut df = df;
            let total = config.numeric_columns.len();
            for (index, spec) in config.numeric_columns.iter().enumerate() {
                df = coerce_integer_column(df, spec)?;
                self.report_progress(ProgressUpdate::with_items(
                    PipelineStage::Coercion,
                    index + 1,
                    total,
                    format!("Converted '{}' to integer '{}'", spec.column, spec.output_name()),
                ));
            }

            report.price_summary = self.summarize(&df, &config.price_column)?;
            report.mileage_summary = self.summarize(&df, &config.mileage_column)?;
            for (column, summary) in [
                (&config.price_column, &report.price_summary),
                (&config.mileage_column, &report.mileage_summary),
            ] {
                if let Some(summary) = summary {
                    self.report_progress(
                        ProgressUpdate::new(
                            PipelineStage::Coercion,
                            1.0,
                            format!("Summary of '{}'", column),
                        )
                        .with_details(tables::summary_table(summary)),
                    );
                }
            }

            let mileages = df.column(&config.mileage_column)?.as_materialized_series();
            report.mileage_counts = value_counts_by_value(mileages)?;
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::Coercion,
                    1.0,
                    format!(
                        "'{}' takes {} distinct values",
                        config.mileage_column,
                        report.mileage_counts.len()
                    ),
                )
                .with_details(tables::value_counts_table(&report.mileage_counts)),
            );
            Ok(df)
        })?;

        let df = self.stage(PipelineStage::PriceFilter, || {
            let prices = df.column(&config.price_column)?.as_materialized_series();
            let by_price = value_counts_by_value(prices)?;
            let extremes = config.price_extremes.min(by_price.len());
            report.lowest_prices = by_price[..extremes].to_vec();
            report.highest_prices = by_price.iter().rev().take(extremes).cloned().collect();
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::PriceFilter,
                    0.5,
                    format!("{} lowest and highest prices", extremes),
                )
                .with_details(format!(
                    "{}\n{}",
                    tables::value_counts_table(&report.lowest_prices),
                    tables::value_counts_table(&report.highest_prices)
                )),
            );

            let (df, outcome) = self.apply_range_filter(
                PipelineStage::PriceFilter,
                df,
                &config.price_column,
                config.price_bounds,
            )?;
            report.price_filter = Some(outcome);
            Ok(df)
        })?;

        self.stage(PipelineStage::DateExploration, || {
            let total = config.date_columns.len();
            for (index, column) in config.date_columns.iter().enumerate() {
                if !has_column(&df, column) {
                    return Err(PipelineError::ColumnNotFound(column.clone()));
                }
                let distribution = date_distribution(df.column(column)?.as_materialized_series())?;
                let range = match (distribution.earliest, distribution.latest) {
                    (Some(earliest), Some(latest)) => format!("{} to {}", earliest, latest),
                    _ => "no parseable dates".to_string(),
                };
                self.report_progress(
                    ProgressUpdate::with_items(
                        PipelineStage::DateExploration,
                        index + 1,
                        total,
                        format!(
                            "'{}' spans {} over {} distinct dates",
                            column,
                            range,
                            distribution.shares.len()
                        ),
                    )
                    .with_details(tables::date_table(&distribution)),
                );
                report.date_distributions.push(distribution);
            }
            Ok(())
        })?;

        let df = self.stage(PipelineStage::RegistrationYearFilter, || {
            let column = &config.registration_year_column;
            report.registration_year_summary = self.summarize(&df, column)?;
            if let Some(summary) = &report.registration_year_summary {
                self.report_progress(
                    ProgressUpdate::new(
                        PipelineStage::RegistrationYearFilter,
                        0.3,
                        format!(
                            "Registration years range from {} to {}",
                            summary.min, summary.max
                        ),
                    )
                    .with_details(tables::summary_table(summary)),
                );
            }

            let (df, outcome) = self.apply_range_filter(
                PipelineStage::RegistrationYearFilter,
                df,
                column,
                config.registration_year_bounds,
            )?;
            report.registration_year_filter = Some(outcome);

            report.registration_year_shares =
                value_counts(df.column(column)?.as_materialized_series())?;
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::RegistrationYearFilter,
                    1.0,
                    "Registration year shares after filtering",
                )
                .with_details(tables::value_counts_table(&report.registration_year_shares)),
            );
            Ok(df)
        })?;

        self.stage(PipelineStage::BrandAnalysis, || {
            let category = &config.category_column;
            if !has_column(&df, category) {
                return Err(PipelineError::ColumnNotFound(category.clone()));
            }
            report.brand_counts = value_counts(df.column(category)?.as_materialized_series())?;
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::BrandAnalysis,
                    0.25,
                    format!("{} distinct brands", report.brand_counts.len()),
                )
                .with_details(tables::value_counts_table(&report.brand_counts)),
            );

            report.top_brand_prices =
                mean_by_category(&df, category, &config.price_column, &config.top_brands)?;
            self.report_progress(
                ProgressUpdate::new(PipelineStage::BrandAnalysis, 0.5, "Mean price of top brands")
                    .with_details(tables::means_table(&report.top_brand_prices)),
            );

            report.bottom_brand_prices =
                mean_by_category(&df, category, &config.price_column, &config.bottom_brands)?;
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::BrandAnalysis,
                    0.75,
                    "Mean price of bottom brands",
                )
                .with_details(tables::means_table(&report.bottom_brand_prices)),
            );

            report.top_brand_mileage =
                mean_by_category(&df, category, &config.mileage_column, &config.top_brands)?;
            self.report_progress(
                ProgressUpdate::new(PipelineStage::BrandAnalysis, 1.0, "Mean mileage of top brands")
                    .with_details(tables::means_table(&report.top_brand_mileage)),
            );
            Ok(())
        })?;

        self.stage(PipelineStage::Reporting, || {
            report.brand_comparison =
                BrandComparison::assemble(&report.top_brand_mileage, &report.top_brand_prices)?;
            self.report_progress(
                ProgressUpdate::new(
                    PipelineStage::Reporting,
                    1.0,
                    "Brands by mean mileage, with mean price",
                )
                .with_details(report.brand_comparison.to_string()),
            );
            Ok(())
        })?;

        report.cleaned = TableShape::of(&df);
        info!(
            "Pipeline finished in {}ms: {} of {} listings kept",
            start_time.elapsed().as_millis(),
            report.cleaned.rows,
            report.loaded.rows
        );

        Ok(PipelineResult {
            listings: df,
            report,
        })
    }

    fn summarize(&self, df: &DataFrame, column: &str) -> Result<Option<NumericSummary>> {
        if !has_column(df, column) {
            return Err(PipelineError::ColumnNotFound(column.to_string()));
        }
        Ok(describe_integers(df.column(column)?.as_materialized_series())?)
    }

    fn apply_range_filter(
        &self,
        stage: PipelineStage,
        df: DataFrame,
        column: &str,
        bounds: RangeBounds,
    ) -> Result<(DataFrame, FilterOutcome)> {
        let share_outside = share_outside_range(&df, column, bounds)?;
        let rows_before = df.height();
        let df = filter_range(df, column, bounds)?;
        let outcome = FilterOutcome {
            column: column.to_string(),
            bounds,
            rows_before,
            rows_after: df.height(),
            share_outside,
        };

        if outcome.removed_fraction() > NOTABLE_LOSS_FRACTION {
            warn!(
                "Filtering {} to {} removed {:.1}% of listings",
                column,
                bounds,
                outcome.removed_fraction() * 100.0
            );
        }
        self.report_progress(ProgressUpdate::new(
            stage,
            1.0,
            format!(
                "Kept {} of {} listings with {} in {} ({:.2}% outside)",
                outcome.rows_after,
                outcome.rows_before,
                column,
                bounds,
                share_outside * 100.0
            ),
        ));
        Ok((df, outcome))
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use listing_pipeline::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct Narrator;
    ///
    /// impl ProgressReporter for Narrator {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(Narrator))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
