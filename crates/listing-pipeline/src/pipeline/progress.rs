//! Progress reporting for the listing pipeline.
//!
//! Stages never print. They describe what they did in [`ProgressUpdate`]s
//! that the pipeline forwards to an injected [`ProgressReporter`]; the binary
//! turns those into narration.
//!
//! # Example
//!
//! ```rust,ignore
//! use listing_pipeline::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{}] {}", update.stage.display_name(), update.message);
//!     })
//!     .build()?
//!     .run("data/autos.csv")?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the listing pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading and decoding the input file
    Loading,
    /// Renaming source headers
    Renaming,
    /// Dropping uninformative columns
    Pruning,
    /// Converting formatted text columns to integers
    Coercion,
    /// Removing listings with implausible prices
    PriceFilter,
    /// Summarising crawl, creation and last-seen dates
    DateExploration,
    /// Removing listings with implausible registration years
    RegistrationYearFilter,
    /// Brand counts and per-brand means
    BrandAnalysis,
    /// Assembling the brand comparison
    Reporting,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Listings",
            Self::Renaming => "Renaming Columns",
            Self::Pruning => "Pruning Columns",
            Self::Coercion => "Coercing Numbers",
            Self::PriceFilter => "Filtering Prices",
            Self::DateExploration => "Exploring Dates",
            Self::RegistrationYearFilter => "Filtering Registration Years",
            Self::BrandAnalysis => "Analyzing Brands",
            Self::Reporting => "Building Report",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run attributed to this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.20,
            Self::Renaming => 0.05,
            Self::Pruning => 0.05,
            Self::Coercion => 0.20,
            Self::PriceFilter => 0.10,
            Self::DateExploration => 0.10,
            Self::RegistrationYearFilter => 0.10,
            Self::BrandAnalysis => 0.15,
            Self::Reporting => 0.05,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Renaming => 0.20,
            Self::Pruning => 0.25,
            Self::Coercion => 0.30,
            Self::PriceFilter => 0.50,
            Self::DateExploration => 0.60,
            Self::RegistrationYearFilter => 0.70,
            Self::BrandAnalysis => 0.80,
            Self::Reporting => 0.95,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single narration event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// One-line description of what happened
    pub message: String,

    /// Multi-line supporting output, such as a rendered table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an update reporting `current` of `total` items done.
    pub fn with_items(
        stage: PipelineStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self::new(stage, stage_progress, message)
    }

    /// Attach supporting output to the update.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            details: None,
        }
    }
}

/// Receives progress updates during a pipeline run.
///
/// Updates arrive in stage order, after the work they describe is done.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
