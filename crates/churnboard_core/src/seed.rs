//! Fixed demo roster loaded at session start.

use crate::model::customer::CustomerRecord;

/// Returns the seed customer roster in dashboard order.
///
/// Ids are unique and every record satisfies `CustomerRecord::validate()`.
pub fn seed_customers() -> Vec<CustomerRecord> {
    vec![
        CustomerRecord::new(
            "C1",
            "Northwind Telecom",
            8_000.0,
            85.0,
            &[
                "Inactivity on Key Feature [Actionable]",
                "Tenure under 12 months",
            ],
        ),
        CustomerRecord::new("C2", "Bluewave Mobile", 12_000.0, 65.0, &[]),
        CustomerRecord::new(
            "C3",
            "Orbit Fiber Co.",
            25_500.0,
            92.0,
            &[
                "Price sensitivity [Ignore]",
                "Billing issue [Actionable]",
                "Support ticket spike [Actionable]",
            ],
        ),
        CustomerRecord::new(
            "C4",
            "Kestrel & Sons Logistics",
            4_200.0,
            78.0,
            &["Low API Usage [Actionable]"],
        ),
        CustomerRecord::new(
            "C5",
            "Páramo Conectividad",
            15_750.0,
            71.0,
            &[
                "Contract renewal approaching [Actionable]",
                "Competitor outreach detected",
            ],
        ),
        CustomerRecord::new(
            "C6",
            "Helix Data Centers",
            31_000.0,
            48.0,
            &["Feature adoption decline [Actionable]"],
        ),
        CustomerRecord::new(
            "C7",
            "Summit Rural Broadband",
            6_400.0,
            65.0,
            &["Executive sponsor departed [Actionable]"],
        ),
        CustomerRecord::new(
            "C8",
            "Lumen Street Cafe",
            900.0,
            33.0,
            &["Seasonal usage dip [Ignore]"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::seed_customers;
    use crate::model::store::CustomerStore;

    #[test]
    fn seed_roster_satisfies_store_invariants() {
        let store = CustomerStore::try_from_records(seed_customers()).unwrap();
        assert_eq!(store.len(), 8);
        assert!(store.records().iter().all(|record| record.note.is_empty()));
    }
}
