//! Value-threshold filtering and risk ordering for the dashboard list.
//!
//! # Invariants
//! - Only records with `lifetime_value >= threshold` are returned.
//! - Output is ordered by `risk_score` descending; ties keep store order.
//! - The result is never truncated.
//! - Invalid thresholds degrade to `DEFAULT_THRESHOLD`; nothing here fails.

use crate::model::customer::CustomerRecord;

/// Threshold applied when the user input is not a finite number.
pub const DEFAULT_THRESHOLD: f64 = 5_000.0;

/// Parses a raw threshold field.
///
/// Non-numeric, empty and non-finite input (`"abc"`, `""`, `"NaN"`,
/// `"inf"`) yields `DEFAULT_THRESHOLD`. Negative numbers pass through.
pub fn parse_threshold(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => DEFAULT_THRESHOLD,
    }
}

/// Filters by minimum lifetime value and sorts by risk, highest first.
pub fn prioritize(records: &[CustomerRecord], threshold: f64) -> Vec<&CustomerRecord> {
    let threshold = if threshold.is_finite() {
        threshold
    } else {
        DEFAULT_THRESHOLD
    };

    let mut retained: Vec<&CustomerRecord> = records
        .iter()
        .filter(|record| record.lifetime_value >= threshold)
        .collect();
    // `sort_by` is stable.
    retained.sort_by(|left, right| right.risk_score.total_cmp(&left.risk_score));
    retained
}

/// Parses raw input and prioritizes in one step.
pub fn prioritize_input<'a>(records: &'a [CustomerRecord], raw: &str) -> Vec<&'a CustomerRecord> {
    prioritize(records, parse_threshold(raw))
}
