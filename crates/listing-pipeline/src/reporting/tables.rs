//! Plain-text tables attached to narration updates.

use crate::aggregate::GroupedMeans;
use crate::profiler::{DateDistribution, NumericSummary, ValueCount};

/// One `value count share%` line per entry.
pub fn value_counts_table(counts: &[ValueCount]) -> String {
    counts
        .iter()
        .map(|entry| {
            format!(
                "{:<16} {:>8} {:>8.2}%\n",
                entry.value,
                entry.count,
                entry.share * 100.0
            )
        })
        .collect()
}

/// `describe()`-style summary, one statistic per line.
pub fn summary_table(summary: &NumericSummary) -> String {
    let rows: [(&str, String); 9] = [
        ("count", summary.count.to_string()),
        ("unique", summary.unique.to_string()),
        ("mean", format!("{:.2}", summary.mean)),
        ("std", format!("{:.2}", summary.std)),
        ("min", summary.min.to_string()),
        ("25%", format!("{:.2}", summary.q25)),
        ("50%", format!("{:.2}", summary.median)),
        ("75%", format!("{:.2}", summary.q75)),
        ("max", summary.max.to_string()),
    ];

    rows.iter()
        .map(|(label, value)| format!("{label:<8} {value:>14}\n"))
        .collect()
}

pub fn date_table(distribution: &DateDistribution) -> String {
    distribution
        .shares
        .iter()
        .map(|share| format!("{:<12} {:>8.4}\n", share.date, share.share))
        .collect()
}

/// `category mean` lines in the order the means were computed.
pub fn means_table(means: &GroupedMeans) -> String {
    means
        .iter()
        .map(|entry| format!("{:<16} {:>12}\n", entry.category, entry.mean))
        .collect()
}
