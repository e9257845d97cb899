use churnboard_core::{
    parse_threshold, prioritize, prioritize_input, seed_customers, CustomerRecord,
    DEFAULT_THRESHOLD,
};

fn ids<'a>(records: &[&'a CustomerRecord]) -> Vec<&'a str> {
    records.iter().map(|&record| record.id.as_str()).collect()
}

fn scenario() -> Vec<CustomerRecord> {
    vec![
        CustomerRecord::new(
            "C1",
            "Northwind",
            8_000.0,
            85.0,
            &["Inactivity on Key Feature [Actionable]"],
        ),
        CustomerRecord::new("C2", "Bluewave", 12_000.0, 65.0, &[]),
    ]
}

#[test]
fn example_scenario_orders_by_risk() {
    let store = scenario();
    assert_eq!(ids(&prioritize(&store, 5_000.0)), vec!["C1", "C2"]);
}

#[test]
fn retains_only_records_at_or_above_threshold() {
    let store = seed_customers();
    for threshold in [-1_000.0, 0.0, 900.0, 6_400.0, 15_750.0, 1_000_000.0] {
        let result = prioritize(&store, threshold);
        assert!(result
            .iter()
            .all(|record| record.lifetime_value >= threshold));
        let expected = store
            .iter()
            .filter(|record| record.lifetime_value >= threshold)
            .count();
        assert_eq!(result.len(), expected, "threshold {threshold}");
    }
}

#[test]
fn negative_and_zero_thresholds_keep_everyone() {
    let store = seed_customers();
    assert_eq!(prioritize_input(&store, "-5").len(), store.len());
    assert_eq!(prioritize_input(&store, "0").len(), store.len());
}

#[test]
fn non_numeric_threshold_uses_default() {
    let store = seed_customers();
    let by_default = ids(&prioritize(&store, DEFAULT_THRESHOLD));
    for raw in ["", "abc", "NaN", "12k", "   "] {
        assert_eq!(parse_threshold(raw), DEFAULT_THRESHOLD);
        assert_eq!(ids(&prioritize_input(&store, raw)), by_default, "raw {raw:?}");
    }
}

#[test]
fn output_is_sorted_descending_and_stable_on_ties() {
    let store = vec![
        CustomerRecord::new("T1", "first tie", 100.0, 50.0, &[]),
        CustomerRecord::new("H", "high", 100.0, 99.0, &[]),
        CustomerRecord::new("T2", "second tie", 100.0, 50.0, &[]),
        CustomerRecord::new("L", "low", 100.0, 1.0, &[]),
        CustomerRecord::new("T3", "third tie", 100.0, 50.0, &[]),
    ];
    let result = prioritize(&store, 0.0);
    assert_eq!(ids(&result), vec!["H", "T1", "T2", "T3", "L"]);
    assert!(result
        .windows(2)
        .all(|pair| pair[0].risk_score >= pair[1].risk_score));
}

#[test]
fn seed_ties_keep_store_order() {
    // C2 and C7 both score 65.
    let store = seed_customers();
    let result = ids(&prioritize(&store, 0.0));
    let c2 = result.iter().position(|id| *id == "C2").unwrap();
    let c7 = result.iter().position(|id| *id == "C7").unwrap();
    assert!(c2 < c7);
}

#[test]
fn result_is_not_capped() {
    let store: Vec<CustomerRecord> = (0..40)
        .map(|index| {
            CustomerRecord::new(
                format!("X{index}"),
                "bulk",
                10_000.0,
                f64::from(index % 100),
                &[],
            )
        })
        .collect();
    assert_eq!(prioritize(&store, 0.0).len(), 40);
}
