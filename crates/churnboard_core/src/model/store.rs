//! In-memory customer store.
//!
//! # Responsibility
//! - Own the ordered session roster passed into prioritizer/persister calls.
//! - Enforce id uniqueness for seed rosters.
//!
//! # Invariants
//! - Record order is the seed (or snapshot) order and never changes.
//! - Records are never added or removed after construction.
//! - Only `note` is mutated, and only through the note persister.

use crate::model::customer::{CustomerRecord, CustomerValidationError};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store construction error.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Two records share the same id.
    DuplicateId(String),
    /// One record violates record-level invariants.
    InvalidRecord(CustomerValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate customer id: `{id}`"),
            Self::InvalidRecord(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DuplicateId(_) => None,
            Self::InvalidRecord(err) => Some(err),
        }
    }
}

impl From<CustomerValidationError> for StoreError {
    fn from(value: CustomerValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

/// Ordered roster of customer records for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerStore {
    records: Vec<CustomerRecord>,
}

impl CustomerStore {
    /// Builds a store after validating every record and id uniqueness.
    pub fn try_from_records(records: Vec<CustomerRecord>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(record.id.as_str()) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
        }
        Ok(Self { records })
    }

    /// Wraps records loaded from a persisted snapshot without rejecting them.
    ///
    /// Snapshots are used as stored; violations are logged only.
    pub fn from_snapshot_unchecked(records: Vec<CustomerRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if let Err(err) = record.validate() {
                warn!(
                    "event=store_snapshot_check module=store status=warn error_code=invalid_record error={}",
                    err
                );
            }
            if !seen.insert(record.id.as_str()) {
                warn!(
                    "event=store_snapshot_check module=store status=warn error_code=duplicate_id id={}",
                    record.id
                );
            }
        }
        Self { records }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Detail lookup by id. First match wins.
    pub fn get(&self, id: &str) -> Option<&CustomerRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut CustomerRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Serializes the whole roster as one JSON array.
    pub fn to_snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records)
    }

    /// Consumes the store and returns its records.
    pub fn into_records(self) -> Vec<CustomerRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomerStore, StoreError};
    use crate::model::customer::CustomerRecord;

    #[test]
    fn rejects_duplicate_ids() {
        let records = vec![
            CustomerRecord::new("C1", "Acme", 100.0, 10.0, &[]),
            CustomerRecord::new("C1", "Acme Two", 200.0, 20.0, &[]),
        ];
        let err = CustomerStore::try_from_records(records).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId("C1".to_string()));
    }

    #[test]
    fn snapshot_records_are_kept_as_is() {
        let records = vec![
            CustomerRecord::new("C1", "Acme", -5.0, 10.0, &[]),
            CustomerRecord::new("C1", "Acme Two", 200.0, 20.0, &[]),
        ];
        let store = CustomerStore::from_snapshot_unchecked(records.clone());
        assert_eq!(store.records(), records.as_slice());
    }

    #[test]
    fn snapshot_json_uses_wire_field_names() {
        let mut record =
            CustomerRecord::new("C1", "Acme", 8000.0, 85.0, &["Billing issue [Actionable]"]);
        record.note = "called".to_string();
        let store = CustomerStore::try_from_records(vec![record]).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&store.to_snapshot_json().unwrap()).unwrap();
        assert_eq!(json[0]["id"], "C1");
        assert_eq!(json[0]["lifetimeValue"], 8000.0);
        assert_eq!(json[0]["riskScore"], 85.0);
        assert_eq!(json[0]["topDrivers"][0], "Billing issue [Actionable]");
        assert_eq!(json[0]["note"], "called");
    }
}
