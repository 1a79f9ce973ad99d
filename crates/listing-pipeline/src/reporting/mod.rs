//! Report assembly and text rendering.
//!
//! [`BrandComparison`] joins the per-brand means into the final table; the
//! [`tables`] helpers render intermediate findings for narration.

mod brand_comparison;
pub mod tables;

pub use brand_comparison::{BrandComparison, BrandComparisonRow};
