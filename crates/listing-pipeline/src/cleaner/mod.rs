//! Cleaning stages for the listing table.
//!
//! This module provides:
//! - Column renaming (positional, or checked against expected source headers)
//! - Column pruning
//! - Coercion of formatted text (`"$8,500"`, `"150,000km"`) into integers
//! - Inclusive range filters

mod columns;
mod converters;
mod filters;

pub use columns::{drop_column, rename_columns, rename_columns_checked};
pub use converters::{clean_integer, coerce_integer_column};
pub use filters::{filter_range, share_outside_range};

pub(crate) use columns::has_column;
