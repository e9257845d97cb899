//! Dashboard header figures.

use crate::model::customer::{CustomerRecord, RiskTier};

/// Aggregate view over a set of customers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioSummary {
    pub customer_count: usize,
    pub high_risk_count: usize,
    /// Customers with at least one actionable driver.
    pub actionable_count: usize,
    pub total_lifetime_value: f64,
    /// Sum of `lifetime_value * risk_score / 100`.
    pub value_at_risk: f64,
}

/// Summarizes any slice of records, typically the prioritized list.
pub fn summarize<'a, I>(records: I) -> PortfolioSummary
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    records
        .into_iter()
        .fold(PortfolioSummary::default(), |mut summary, record| {
            summary.customer_count += 1;
            if record.risk_tier() == RiskTier::High {
                summary.high_risk_count += 1;
            }
            if record.primary_actionable_driver().is_some() {
                summary.actionable_count += 1;
            }
            summary.total_lifetime_value += record.lifetime_value;
            summary.value_at_risk += record.lifetime_value * record.risk_score / 100.0;
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::{summarize, PortfolioSummary};
    use crate::model::customer::CustomerRecord;

    #[test]
    fn empty_input_yields_zeroes() {
        let records: Vec<CustomerRecord> = Vec::new();
        assert_eq!(summarize(&records), PortfolioSummary::default());
    }

    #[test]
    fn sums_value_at_risk() {
        let records = vec![
            CustomerRecord::new("A", "a", 1_000.0, 80.0, &["x [Actionable]"]),
            CustomerRecord::new("B", "b", 2_000.0, 25.0, &["y [Ignore]"]),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.customer_count, 2);
        assert_eq!(summary.high_risk_count, 1);
        assert_eq!(summary.actionable_count, 1);
        assert_eq!(summary.total_lifetime_value, 3_000.0);
        assert_eq!(summary.value_at_risk, 1_300.0);
    }
}
