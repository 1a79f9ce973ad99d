//! Used-Car Listing Pipeline Library
//!
//! Cleans a scraped table of used-car advertisements and compares the most
//! common brands by mean mileage and mean price. Built on Polars.
//!
//! # Overview
//!
//! A run is a fixed sequence of stages, each taking the table from the
//! previous one:
//!
//! - **Loading**: Latin-1 (or UTF-8) CSV decoded into an all-text table
//! - **Renaming**: source headers checked and replaced with snake_case names
//! - **Pruning**: uninformative columns dropped
//! - **Coercion**: formatted values such as `"$5,000"` and `"150,000km"` turned into integers
//! - **Filtering**: implausible prices and registration years removed
//! - **Brand analysis**: truncated per-brand means and the brand comparison table
//!
//! Every stage records what it found in a [`ListingReport`] and narrates
//! through an optional [`ProgressReporter`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use listing_pipeline::{Pipeline, PipelineConfig};
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("data/autos.csv")?;
//!
//! println!("{}", result.report.brand_comparison);
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to change bounds, brand lists or the column layout:
//!
//! ```rust,ignore
//! use listing_pipeline::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .price_bounds(RangeBounds::new(100, 350_000))
//!     .registration_year_bounds(RangeBounds::new(1950, 2016))
//!     .top_brands(["volkswagen", "bmw", "opel"])
//!     .build()?;
//! ```
//!
//! The individual stages are public too ([`cleaner`], [`aggregate`],
//! [`profiler`]) and can be composed without the pipeline.

pub mod aggregate;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregate::{GroupMean, GroupedMeans, mean_by_category};
pub use config::{
    ColumnMapping, ConfigValidationError, NumericColumnSpec, PipelineConfig,
    PipelineConfigBuilder, RangeBounds, TextEncoding,
};
pub use error::{PipelineError, ResultExt};
pub use loader::{load_listings, load_listings_from_bytes};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use reporting::{BrandComparison, BrandComparisonRow};
pub use types::{DroppedColumn, FilterOutcome, ListingReport, PipelineResult, TableShape};
