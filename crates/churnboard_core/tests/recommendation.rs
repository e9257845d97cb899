use churnboard_core::{
    matched_rule, play_for, recommend, recommend_record, seed_customers, CustomerRecord, Play,
    RecommendationError,
};
use serde_json::{json, Value};

#[test]
fn rejects_non_customer_values() {
    let invalid = [
        Value::Null,
        json!(42),
        json!("string"),
        json!(true),
        json!([]),
        json!({}),
        json!({ "name": "x" }),
        json!({ "topDrivers": [] }),
        json!({ "name": 7, "topDrivers": [] }),
        json!({ "name": "x", "topDrivers": "Billing issue [Actionable]" }),
    ];
    for value in invalid {
        let err = recommend(&value).unwrap_err();
        assert!(
            matches!(err, RecommendationError::InvalidArgument(_)),
            "value {value}"
        );
    }
}

#[test]
fn example_scenario_recommendations() {
    let c1 = json!({
        "id": "C1",
        "name": "Northwind Telecom",
        "lifetimeValue": 8000,
        "riskScore": 85,
        "topDrivers": ["Inactivity on Key Feature [Actionable]"]
    });
    let c2 = json!({
        "id": "C2",
        "name": "Bluewave Mobile",
        "lifetimeValue": 12000,
        "riskScore": 65,
        "topDrivers": []
    });

    let first = recommend(&c1).unwrap();
    assert!(first.contains("feature walkthrough"));
    assert!(first.contains("Northwind Telecom"));

    let second = recommend(&c2).unwrap();
    assert!(second.contains("Monitor"));
    assert!(second.contains("Bluewave Mobile"));
}

#[test]
fn ignore_only_drivers_fall_back_to_monitor() {
    let value = json!({
        "name": "Lumen",
        "topDrivers": ["Billing issue [Ignore]", "Low API Usage [Ignore]"]
    });
    let text = recommend(&value).unwrap();
    assert!(text.contains("Monitor"));
    assert!(text.contains("Lumen"));
}

#[test]
fn malformed_driver_entries_are_skipped() {
    let value = json!({
        "name": "Kestrel",
        "topDrivers": [null, 17, {"tag": "x"}, "Low API Usage [Actionable]", false]
    });
    let text = recommend(&value).unwrap();
    assert!(text.contains("API usage"));
    assert!(text.contains("Kestrel"));
}

#[test]
fn unknown_actionable_driver_gets_executive_check_in() {
    let value = json!({
        "name": "Summit",
        "topDrivers": ["Executive sponsor departed [Actionable]", "Billing issue [Actionable]"]
    });
    let text = recommend(&value).unwrap();
    assert!(text.contains("executive check-in"));
    assert!(text.contains("Summit"));
}

#[test]
fn playbook_phrase_must_appear_literally_in_tag() {
    for tag in [
        "Billing [Actionable] issue",
        "Billing  issue [Actionable]",
        "Billing\tissue [Actionable]",
    ] {
        let value = json!({ "name": "X", "topDrivers": [tag] });
        let text = recommend(&value).unwrap();
        assert!(text.contains("executive check-in"), "tag {tag:?}: {text}");
        assert!(!text.contains("billing operations"), "tag {tag:?}");
    }

    let marker_first = json!({ "name": "X", "topDrivers": ["[Actionable] Billing issue"] });
    assert!(recommend(&marker_first).unwrap().contains("billing operations"));
}

#[test]
fn output_is_deterministic() {
    let value = json!({
        "name": "Orbit Fiber Co.",
        "topDrivers": ["Price sensitivity [Ignore]", "Billing issue [Actionable]"]
    });
    let copy: Value = serde_json::from_str(&value.to_string()).unwrap();
    assert_eq!(recommend(&value).unwrap(), recommend(&copy).unwrap());
}

#[test]
fn typed_and_dynamic_paths_agree_on_seed() {
    for record in seed_customers() {
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(recommend(&value).unwrap(), recommend_record(&record));
    }
}

#[test]
fn seed_covers_every_branch() {
    let customers = seed_customers();
    let play = |id: &str| {
        let record: &CustomerRecord = customers.iter().find(|r| r.id == id).unwrap();
        play_for(record)
    };
    assert_eq!(play("C2"), Play::Monitor);
    assert_eq!(play("C8"), Play::Monitor);
    assert_eq!(play("C7"), Play::ExecutiveCheckIn);
    assert_eq!(play("C3").label(), "Billing issue");

    let matched: Vec<&str> = customers
        .iter()
        .filter_map(matched_rule)
        .map(|rule| rule.phrase)
        .collect();
    assert_eq!(
        matched,
        vec![
            "Inactivity on Key Feature",
            "Billing issue",
            "Low API Usage",
            "Contract renewal approaching",
            "Feature adoption decline",
        ]
    );
}
