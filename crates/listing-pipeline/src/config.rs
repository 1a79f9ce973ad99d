//! Configuration types for the listing pipeline.
//!
//! The bounds, brand lists and column layout observed in the eBay car sales
//! dataset are the defaults; all of them can be overridden through the
//! builder or a JSON document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text encoding of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Single-byte Latin-1 (the observed dataset)
    #[default]
    Latin1,
    /// Strict UTF-8
    Utf8,
}

impl TextEncoding {
    /// Canonical label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Latin1 => "Latin-1",
            Self::Utf8 => "UTF-8",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            other => Err(ConfigValidationError::UnknownEncoding(other.to_string())),
        }
    }
}

/// Maps a header of the source file to the column name used downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: String,
}

impl ColumnMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A text column that must be coerced to integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericColumnSpec {
    /// Column to coerce (name after renaming).
    pub column: String,
    /// Literal substrings removed before parsing, applied in order.
    #[serde(default)]
    pub strip: Vec<String>,
    /// New name for the column once it holds integers.
    #[serde(default)]
    pub rename_to: Option<String>,
}

impl NumericColumnSpec {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            strip: Vec::new(),
            rename_to: None,
        }
    }

    pub fn stripping(mut self, literals: &[&str]) -> Self {
        self.strip = literals.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn renamed_to(mut self, name: impl Into<String>) -> Self {
        self.rename_to = Some(name.into());
        self
    }

    /// Name of the column after coercion.
    pub fn output_name(&self) -> &str {
        self.rename_to.as_deref().unwrap_or(&self.column)
    }
}

/// Inclusive `[low, high]` bounds for a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub low: i64,
    pub high: i64,
}

impl RangeBounds {
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Source headers of the eBay car sales dataset and their cleaned names.
pub const DEFAULT_COLUMNS: [(&str, &str); 20] = [
    ("dateCrawled", "date_crawled"),
    ("name", "name"),
    ("seller", "seller"),
    ("offerType", "offer_type"),
    ("price", "price"),
    ("abtest", "abtest"),
    ("vehicleType", "vehicle_type"),
    ("yearOfRegistration", "registration_year"),
    ("gearbox", "gearbox"),
    ("powerPS", "power_ps"),
    ("model", "model"),
    ("odometer", "odometer"),
    ("monthOfRegistration", "registration_month"),
    ("fuelType", "fuel_type"),
    ("brand", "brand"),
    ("notRepairedDamage", "unrepaired_damage"),
    ("dateCreated", "ad_created"),
    ("nrOfPictures", "nr_of_pictures"),
    ("postalCode", "postal_code"),
    ("lastSeen", "last_seen"),
];

pub const DEFAULT_PRICE_BOUNDS: RangeBounds = RangeBounds::new(1, 1_000_000);
pub const DEFAULT_REGISTRATION_YEAR_BOUNDS: RangeBounds = RangeBounds::new(1900, 2016);

pub const DEFAULT_TOP_BRANDS: [&str; 5] = ["volkswagen", "bmw", "opel", "mercedes_benz", "audi"];
pub const DEFAULT_BOTTOM_BRANDS: [&str; 5] = ["lada", "lancia", "rover", "trabant", "daewoo"];

fn default_numeric_columns() -> Vec<NumericColumnSpec> {
    vec![
        NumericColumnSpec::new("price").stripping(&["$", ","]),
        NumericColumnSpec::new("odometer")
            .stripping(&["km", ","])
            .renamed_to("odometer_km"),
        NumericColumnSpec::new("registration_year"),
        NumericColumnSpec::new("power_ps"),
        NumericColumnSpec::new("registration_month"),
        NumericColumnSpec::new("postal_code"),
    ]
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Configuration for the listing pipeline.
///
/// Use [`PipelineConfig::builder()`] to override individual settings.
///
/// # Example
///
/// ```rust,ignore
/// use listing_pipeline::config::{PipelineConfig, RangeBounds};
///
/// let config = PipelineConfig::builder()
///     .price_bounds(RangeBounds::new(100, 350_000))
///     .top_brands(["volkswagen", "bmw"])
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Encoding of the input file.
    /// Default: Latin1
    pub encoding: TextEncoding,

    /// Check each source header against `columns` before renaming.
    /// When false, columns are renamed purely by position.
    /// Default: true
    pub validate_source_headers: bool,

    /// Expected source headers, in file order, with their new names.
    pub columns: Vec<ColumnMapping>,

    /// Columns removed after renaming.
    /// Default: ["nr_of_pictures"]
    pub drop_columns: Vec<String>,

    /// Text columns coerced to integers, in order.
    pub numeric_columns: Vec<NumericColumnSpec>,

    /// Column holding the listing price (after coercion).
    pub price_column: String,

    /// Column holding the mileage (after coercion and renaming).
    pub mileage_column: String,

    /// Column holding the registration year.
    pub registration_year_column: String,

    /// Inclusive price bounds.
    /// Default: 1 - 1,000,000
    pub price_bounds: RangeBounds,

    /// Inclusive registration year bounds.
    /// Default: 1900 - 2016
    pub registration_year_bounds: RangeBounds,

    /// Timestamp columns whose date prefix distribution is reported.
    pub date_columns: Vec<String>,

    /// Column used to group listings.
    /// Default: "brand"
    pub category_column: String,

    /// Most common brands, compared on price and mileage.
    pub top_brands: Vec<String>,

    /// Least common brands, compared on price.
    pub bottom_brands: Vec<String>,

    /// Number of lowest and highest prices listed when exploring price outliers.
    /// Default: 5
    pub price_extremes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::default(),
            validate_source_headers: true,
            columns: DEFAULT_COLUMNS
                .iter()
                .map(|(source, target)| ColumnMapping::new(*source, *target))
                .collect(),
            drop_columns: vec!["nr_of_pictures".to_string()],
            numeric_columns: default_numeric_columns(),
            price_column: "price".to_string(),
            mileage_column: "odometer_km".to_string(),
            registration_year_column: "registration_year".to_string(),
            price_bounds: DEFAULT_PRICE_BOUNDS,
            registration_year_bounds: DEFAULT_REGISTRATION_YEAR_BOUNDS,
            date_columns: to_strings(&["date_crawled", "ad_created", "last_seen"]),
            category_column: "brand".to_string(),
            top_brands: to_strings(&DEFAULT_TOP_BRANDS),
            bottom_brands: to_strings(&DEFAULT_BOTTOM_BRANDS),
            price_extremes: 5,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse a configuration from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// New column names, in file order.
    pub fn target_names(&self) -> Vec<String> {
        self.columns.iter().map(|m| m.target.clone()).collect()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, bounds) in [
            ("price_bounds", self.price_bounds),
            ("registration_year_bounds", self.registration_year_bounds),
        ] {
            if bounds.low > bounds.high {
                return Err(ConfigValidationError::InvalidBounds {
                    field: field.to_string(),
                    low: bounds.low,
                    high: bounds.high,
                });
            }
        }

        if self.columns.is_empty() {
            return Err(ConfigValidationError::EmptyList("columns".to_string()));
        }
        if self.top_brands.is_empty() {
            return Err(ConfigValidationError::EmptyList("top_brands".to_string()));
        }
        if self.bottom_brands.is_empty() {
            return Err(ConfigValidationError::EmptyList("bottom_brands".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid bounds for '{field}': low {low} is greater than high {high}")]
    InvalidBounds { field: String, low: i64, high: i64 },

    #[error("'{0}' must not be empty")]
    EmptyList(String),

    #[error("Unknown encoding '{0}' (expected latin-1 or utf-8)")]
    UnknownEncoding(String),
}

impl From<ConfigValidationError> for crate::error::PipelineError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::PipelineError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    base: Option<PipelineConfig>,
    encoding: Option<TextEncoding>,
    validate_source_headers: Option<bool>,
    columns: Option<Vec<ColumnMapping>>,
    drop_columns: Option<Vec<String>>,
    price_bounds: Option<RangeBounds>,
    registration_year_bounds: Option<RangeBounds>,
    top_brands: Option<Vec<String>>,
    bottom_brands: Option<Vec<String>>,
    price_extremes: Option<usize>,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration instead of the defaults.
    pub fn base(mut self, config: PipelineConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the input encoding.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Enable or disable checking source headers before renaming.
    pub fn validate_source_headers(mut self, validate: bool) -> Self {
        self.validate_source_headers = Some(validate);
        self
    }

    /// Replace the expected column layout.
    pub fn columns<I, S, T>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        self.columns = Some(
            columns
                .into_iter()
                .map(|(source, target)| ColumnMapping::new(source, target))
                .collect(),
        );
        self
    }

    /// Replace the list of columns dropped after renaming.
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the inclusive price bounds.
    pub fn price_bounds(mut self, bounds: RangeBounds) -> Self {
        self.price_bounds = Some(bounds);
        self
    }

    /// Set the inclusive registration year bounds.
    pub fn registration_year_bounds(mut self, bounds: RangeBounds) -> Self {
        self.registration_year_bounds = Some(bounds);
        self
    }

    /// Set the brands compared on price and mileage.
    pub fn top_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_brands = Some(brands.into_iter().map(Into::into).collect());
        self
    }

    /// Set the brands compared on price only.
    pub fn bottom_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bottom_brands = Some(brands.into_iter().map(Into::into).collect());
        self
    }

    /// Set how many of the lowest and highest prices are listed.
    pub fn price_extremes(mut self, count: usize) -> Self {
        self.price_extremes = Some(count);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let mut config = self.base.unwrap_or_default();

        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(validate) = self.validate_source_headers {
            config.validate_source_headers = validate;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(drop_columns) = self.drop_columns {
            config.drop_columns = drop_columns;
        }
        if let Some(bounds) = self.price_bounds {
            config.price_bounds = bounds;
        }
        if let Some(bounds) = self.registration_year_bounds {
            config.registration_year_bounds = bounds;
        }
        if let Some(brands) = self.top_brands {
            config.top_brands = brands;
        }
        if let Some(brands) = self.bottom_brands {
            config.bottom_brands = brands;
        }
        if let Some(count) = self.price_extremes {
            config.price_extremes = count;
        }

        config.validate()?;
        Ok(config)
    }
}
