//! Integration tests for the listing pipeline.
//!
//! These tests run the pipeline end to end over Latin-1 CSV fixtures.

use listing_pipeline::{
    Pipeline, PipelineConfig, PipelineError, PipelineStage, RangeBounds, TextEncoding,
    load_listings, load_listings_from_bytes,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> PathBuf {
    fixtures_path().join(filename)
}

fn five_listing_config() -> PipelineConfig {
    PipelineConfig::builder()
        .top_brands(["volkswagen", "bmw"])
        .bottom_brands(["lada"])
        .build()
        .unwrap()
}

fn run_default(filename: &str) -> listing_pipeline::PipelineResult {
    Pipeline::builder()
        .build()
        .unwrap()
        .run(fixture(filename))
        .expect("Pipeline should succeed")
}

fn int_column(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[test]
fn test_five_listings_drop_future_registration() {
    let result = Pipeline::builder()
        .config(five_listing_config())
        .build()
        .unwrap()
        .run(fixture("five_listings.csv"))
        .unwrap();

    assert_eq!(result.listings.height(), 4);
    let years = int_column(&result.listings, "registration_year");
    assert!(!years.contains(&9999));
    assert_eq!(result.report.top_brand_prices.get("volkswagen"), Some(4_000));
    assert_eq!(result.report.bottom_brand_prices.get("lada"), Some(1_350));
}

#[test]
fn test_sample_filters_hold_bounds() {
    let result = run_default("autos_sample.csv");
    let listings = &result.listings;

    assert_eq!(listings.height(), 11);
    assert!(int_column(listings, "price").iter().all(|p| (1..=1_000_000).contains(p)));
    assert!(
        int_column(listings, "registration_year")
            .iter()
            .all(|y| (1900..=2016).contains(y))
    );

    let price_filter = result.report.price_filter.as_ref().unwrap();
    assert_eq!((price_filter.rows_before, price_filter.rows_after), (15, 13));
    assert!((price_filter.share_outside - 2.0 / 15.0).abs() < 1e-12);

    let year_filter = result.report.registration_year_filter.as_ref().unwrap();
    assert_eq!((year_filter.rows_before, year_filter.rows_after), (13, 11));
}

#[test]
fn test_sample_output_columns() {
    let result = run_default("autos_sample.csv");
    let listings = &result.listings;
    let names: Vec<String> = listings
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    assert_eq!(listings.width(), 19);
    assert!(!names.contains(&"nr_of_pictures".to_string()));
    assert!(!names.contains(&"odometer".to_string()));
    assert!(names.contains(&"odometer_km".to_string()));
    assert_eq!(names[0], "date_crawled");
    assert_eq!(
        listings.column("price").unwrap().dtype(),
        &DataType::Int64
    );
    assert_eq!(
        listings.column("date_crawled").unwrap().dtype(),
        &DataType::String
    );
}

#[test]
fn test_sample_brand_means() {
    let report = run_default("autos_sample.csv").report;

    assert_eq!(
        report.top_brand_prices.to_pairs(),
        vec![
            ("volkswagen".to_string(), 4_000),
            ("bmw".to_string(), 8_500),
            ("opel".to_string(), 1_350),
            ("mercedes_benz".to_string(), 9_900),
            ("audi".to_string(), 7_200),
        ]
    );
    assert_eq!(
        report.bottom_brand_prices.to_pairs(),
        vec![
            ("lada".to_string(), 1_800),
            ("lancia".to_string(), 2_200),
            ("rover".to_string(), 1_500),
            ("trabant".to_string(), 4_000),
            ("daewoo".to_string(), 700),
        ]
    );
    assert_eq!(report.top_brand_mileage.get("volkswagen"), Some(137_500));
}

#[test]
fn test_sample_brand_comparison_order() {
    let report = run_default("autos_sample.csv").report;
    let rows: Vec<(&str, i64, i64)> = report
        .brand_comparison
        .rows
        .iter()
        .map(|row| (row.brand.as_str(), row.mean_mileage, row.mean_price))
        .collect();

    // bmw and opel tie on mileage and keep their top_brands order
    assert_eq!(
        rows,
        vec![
            ("bmw", 150_000, 8_500),
            ("opel", 150_000, 1_350),
            ("volkswagen", 137_500, 4_000),
            ("mercedes_benz", 125_000, 9_900),
            ("audi", 90_000, 7_200),
        ]
    );
}

#[test]
fn test_sample_exploration_report() {
    let report = run_default("autos_sample.csv").report;

    assert_eq!(report.loaded.rows, 15);
    assert_eq!(report.loaded.columns, 20);
    assert_eq!(report.dropped_columns[0].name, "nr_of_pictures");
    assert_eq!(report.dropped_columns[0].value_counts.len(), 1);
    assert_eq!(report.dropped_columns[0].value_counts[0].count, 15);

    assert_eq!(report.lowest_prices[0].value, "0");
    assert_eq!(report.highest_prices[0].value, "99999999");
    assert_eq!(report.price_summary.as_ref().unwrap().count, 15);

    // odometer readings are coarse buckets, listed by value
    let mileages = &report.mileage_counts;
    assert_eq!(mileages.len(), 7);
    assert_eq!(mileages[0].value, "5000");
    assert_eq!(
        (mileages[6].value.as_str(), mileages[6].count),
        ("150000", 7)
    );

    let crawled = &report.date_distributions[0];
    assert_eq!(crawled.column, "date_crawled");
    assert_eq!(crawled.earliest.unwrap().to_string(), "2016-03-12");
    assert_eq!(crawled.latest.unwrap().to_string(), "2016-04-04");
    let total: f64 = crawled.shares.iter().map(|share| share.share).sum();
    assert!((total - 1.0).abs() < 1e-9);

    assert_eq!(report.registration_year_summary.as_ref().unwrap().max, 9999);
    assert_eq!(report.brand_counts[0].value, "volkswagen");
    assert_eq!(report.cleaned.rows, 11);
}

#[test]
fn test_bundled_dataset_runs() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/autos.csv");
    let result = Pipeline::builder().build().unwrap().run(path).unwrap();

    assert!(result.listings.height() > 0);
    assert_eq!(result.report.brand_comparison.rows.len(), 5);
    let mileages: Vec<i64> = result
        .report
        .brand_comparison
        .rows
        .iter()
        .map(|row| row.mean_mileage)
        .collect();
    assert!(mileages.windows(2).all(|pair| pair[0] >= pair[1]));
}

// ============================================================================
// Loading and Renaming
// ============================================================================

#[test]
fn test_latin1_text_is_decoded() {
    let df = load_listings(fixture("autos_sample.csv"), TextEncoding::Latin1).unwrap();
    let names = df.column("name").unwrap().as_materialized_series().clone();
    let names: Vec<&str> = names.str().unwrap().into_no_null_iter().collect();

    assert!(names.contains(&"VW_Käfer_1303"));
}

#[test]
fn test_latin1_fixture_is_not_utf8() {
    let error = load_listings(fixture("autos_sample.csv"), TextEncoding::Utf8).unwrap_err();
    assert_eq!(error.error_code(), "DECODE_ERROR");
}

#[test]
fn test_missing_file() {
    let error = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixture("no_such_file.csv"))
        .unwrap_err();

    assert!(matches!(error.root(), PipelineError::FileAccess { .. }));
}

#[test]
fn test_reordered_headers_rejected() {
    let bytes = std::fs::read(fixture("five_listings.csv")).unwrap();
    let text = String::from_utf8_lossy(&bytes).replacen("dateCrawled,name", "name,dateCrawled", 1);
    let df = load_listings_from_bytes(text.as_bytes(), TextEncoding::Utf8).unwrap();

    let error = Pipeline::builder()
        .config(five_listing_config())
        .build()
        .unwrap()
        .process(df)
        .unwrap_err();

    match error.root() {
        PipelineError::HeaderMismatch {
            position,
            expected,
            found,
        } => {
            assert_eq!(*position, 0);
            assert_eq!(expected, "dateCrawled");
            assert_eq!(found, "name");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_positional_rename_without_header_check() {
    let bytes = std::fs::read(fixture("five_listings.csv")).unwrap();
    let text = String::from_utf8_lossy(&bytes).replacen("dateCrawled", "crawl_time", 1);
    let df = load_listings_from_bytes(text.as_bytes(), TextEncoding::Utf8).unwrap();

    let config = PipelineConfig::builder()
        .base(five_listing_config())
        .validate_source_headers(false)
        .build()
        .unwrap();
    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(df)
        .unwrap();

    assert_eq!(result.listings.get_column_names()[0].as_str(), "date_crawled");
    assert_eq!(result.listings.height(), 4);
}

// ============================================================================
// Failure Propagation
// ============================================================================

#[test]
fn test_absent_brand_fails_with_empty_group() {
    let config = PipelineConfig::builder()
        .base(five_listing_config())
        .bottom_brands(["lada", "trabant"])
        .build()
        .unwrap();

    let error = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("five_listings.csv"))
        .unwrap_err();

    assert_eq!(error.error_code(), "EMPTY_GROUP");
    assert!(error.to_string().starts_with("Analyzing Brands"));
}

#[test]
fn test_unparseable_price_names_row() {
    let bytes = std::fs::read(fixture("five_listings.csv")).unwrap();
    let text = String::from_utf8_lossy(&bytes).replacen("\"$8,500\"", "VB", 1);
    let df = load_listings_from_bytes(text.as_bytes(), TextEncoding::Utf8).unwrap();

    let error = Pipeline::builder()
        .config(five_listing_config())
        .build()
        .unwrap()
        .process(df)
        .unwrap_err();

    // second listing in the file
    assert!(error.to_string().contains("(data row 2)"));
    match error.root() {
        PipelineError::NumericParse { column, row, value } => {
            assert_eq!(column, "price");
            assert_eq!(*row, 1);
            assert_eq!(value, "VB");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_failure_is_last_progress_update() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let recorded = stages.clone();

    let config = PipelineConfig::builder()
        .base(five_listing_config())
        .top_brands(["volkswagen", "audi"])
        .build()
        .unwrap();
    let result = Pipeline::builder()
        .config(config)
        .on_progress(move |update| recorded.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(fixture("five_listings.csv"));

    assert!(result.is_err());
    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Loading));
    assert_eq!(stages.last(), Some(&PipelineStage::Failed));
    assert!(!stages.contains(&PipelineStage::Reporting));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_custom_bounds_from_json() {
    let config = PipelineConfig::from_json(
        r#"{
            "price_bounds": { "low": 2000, "high": 9000 },
            "top_brands": ["volkswagen", "bmw"],
            "bottom_brands": ["lada"]
        }"#,
    )
    .unwrap();
    assert_eq!(config.price_bounds, RangeBounds::new(2_000, 9_000));

    let error = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("five_listings.csv"))
        .unwrap_err();

    // the only lada listing costs $1,350
    assert_eq!(error.error_code(), "EMPTY_GROUP");
}

#[test]
fn test_report_serializes_to_json() {
    let report = run_default("autos_sample.csv").report;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["loaded"]["rows"], 15);
    assert_eq!(json["price_filter"]["bounds"]["high"], 1_000_000);
    assert_eq!(json["brand_comparison"]["rows"][0]["brand"], "bmw");
}
