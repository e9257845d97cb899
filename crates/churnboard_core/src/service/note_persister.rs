//! Note persistence use-cases.
//!
//! # Responsibility
//! - Load the session store from snapshot storage, falling back to the seed.
//! - Apply intervention note edits and mirror the whole store to storage.
//!
//! # Invariants
//! - Storage failures are reported (log + outcome), never returned as `Err`.
//! - A failed load yields the seed unchanged; there is no partial merge.
//! - A failed save keeps the in-memory edit.
//! - Unknown customer ids are a no-op.

use crate::model::customer::CustomerRecord;
use crate::model::store::CustomerStore;
use crate::repo::snapshot_repo::{SnapshotStorage, StorageError};
use log::{error, info, warn};
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Storage key holding the serialized store.
pub const SNAPSHOT_KEY: &str = "churnboard.customers";

/// Where the loaded store came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    Snapshot,
    Seed,
}

/// Reported persistence failure.
#[derive(Debug)]
pub enum PersistenceIssue {
    /// Storage read/write failed.
    StorageUnavailable(StorageError),
    /// Stored blob is not a JSON array of customer records.
    MalformedSnapshot(String),
    /// Store could not be encoded.
    Serialization(String),
}

impl Display for PersistenceIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "{err}"),
            Self::MalformedSnapshot(message) => write!(f, "malformed snapshot: {message}"),
            Self::Serialization(message) => write!(f, "snapshot encoding failed: {message}"),
        }
    }
}

impl PersistenceIssue {
    /// Stable code used in log lines and FFI messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::MalformedSnapshot(_) => "malformed_snapshot",
            Self::Serialization(_) => "serialization_failed",
        }
    }
}

/// Result of `load_store`/`reset`.
#[derive(Debug)]
pub struct StoreLoad {
    pub store: CustomerStore,
    pub source: StoreSource,
    /// Set when a failure forced the seed fallback.
    pub issue: Option<PersistenceIssue>,
}

/// Result of `save_note`.
#[derive(Debug)]
pub enum NoteSaveOutcome {
    /// Note applied and store mirrored to storage.
    Saved,
    /// No record with that id; nothing changed.
    UnknownCustomer,
    /// Note applied in memory but the write-through failed.
    NotPersisted(PersistenceIssue),
}

impl NoteSaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Note persister over a snapshot storage backend.
pub struct NotePersister<S: SnapshotStorage> {
    storage: S,
}

impl<S: SnapshotStorage> NotePersister<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Loads the session store.
    ///
    /// Returns the snapshot when present and parseable, otherwise a store
    /// built from `seed` unchanged.
    pub fn load_store(&self, seed: &CustomerStore) -> StoreLoad {
        let started_at = Instant::now();
        let raw = match self.storage.read_snapshot(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=store_load module=note_persister status=ok source=seed reason=absent duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return seed_load(seed, None);
            }
            Err(err) => {
                let issue = PersistenceIssue::StorageUnavailable(err);
                warn!(
                    "event=store_load module=note_persister status=error source=seed error_code={} error={}",
                    issue.code(),
                    issue
                );
                return seed_load(seed, Some(issue));
            }
        };

        match serde_json::from_str::<Vec<CustomerRecord>>(raw.as_str()) {
            Ok(records) => {
                info!(
                    "event=store_load module=note_persister status=ok source=snapshot records={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                StoreLoad {
                    store: CustomerStore::from_snapshot_unchecked(records),
                    source: StoreSource::Snapshot,
                    issue: None,
                }
            }
            Err(err) => {
                let issue = PersistenceIssue::MalformedSnapshot(err.to_string());
                warn!(
                    "event=store_load module=note_persister status=error source=seed error_code={} error={}",
                    issue.code(),
                    issue
                );
                seed_load(seed, Some(issue))
            }
        }
    }

    /// Sets one customer's note and writes the whole store through.
    pub fn save_note(
        &self,
        store: &mut CustomerStore,
        customer_id: &str,
        note_text: impl Into<String>,
    ) -> NoteSaveOutcome {
        let Some(record) = store.get_mut(customer_id) else {
            warn!(
                "event=note_save module=note_persister status=skipped error_code=unknown_customer id={}",
                customer_id
            );
            return NoteSaveOutcome::UnknownCustomer;
        };
        record.note = note_text.into();
        let note_chars = record.note.chars().count();

        match self.write_store(store) {
            Ok(()) => {
                info!(
                    "event=note_save module=note_persister status=ok id={} note_chars={}",
                    customer_id, note_chars
                );
                NoteSaveOutcome::Saved
            }
            Err(issue) => {
                error!(
                    "event=note_save module=note_persister status=error id={} error_code={} error={}",
                    customer_id,
                    issue.code(),
                    issue
                );
                NoteSaveOutcome::NotPersisted(issue)
            }
        }
    }

    /// Drops the persisted snapshot and returns the seed store.
    pub fn reset(&self, seed: &CustomerStore) -> StoreLoad {
        match self.storage.remove_snapshot(SNAPSHOT_KEY) {
            Ok(()) => {
                info!("event=store_reset module=note_persister status=ok");
                seed_load(seed, None)
            }
            Err(err) => {
                let issue = PersistenceIssue::StorageUnavailable(err);
                error!(
                    "event=store_reset module=note_persister status=error error_code={} error={}",
                    issue.code(),
                    issue
                );
                seed_load(seed, Some(issue))
            }
        }
    }

    fn write_store(&self, store: &CustomerStore) -> Result<(), PersistenceIssue> {
        let json = store
            .to_snapshot_json()
            .map_err(|err| PersistenceIssue::Serialization(err.to_string()))?;
        self.storage
            .write_snapshot(SNAPSHOT_KEY, json.as_str())
            .map_err(PersistenceIssue::StorageUnavailable)
    }
}

fn seed_load(seed: &CustomerStore, issue: Option<PersistenceIssue>) -> StoreLoad {
    StoreLoad {
        store: seed.clone(),
        source: StoreSource::Seed,
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::{NotePersister, NoteSaveOutcome, StoreSource, SNAPSHOT_KEY};
    use crate::model::customer::CustomerRecord;
    use crate::model::store::CustomerStore;
    use crate::repo::snapshot_repo::{MemorySnapshotStorage, SnapshotStorage};

    fn seed() -> CustomerStore {
        CustomerStore::try_from_records(vec![CustomerRecord::new(
            "C1", "Acme", 100.0, 10.0, &[],
        )])
        .unwrap()
    }

    #[test]
    fn save_writes_full_store_under_fixed_key() {
        let persister = NotePersister::new(MemorySnapshotStorage::new());
        let mut store = seed();

        let outcome = persister.save_note(&mut store, "C1", "called CFO");
        assert!(outcome.is_saved());

        let raw = persister
            .storage()
            .read_snapshot(SNAPSHOT_KEY)
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["note"], "called CFO");
    }

    #[test]
    fn unknown_id_does_not_touch_storage() {
        let persister = NotePersister::new(MemorySnapshotStorage::new());
        let mut store = seed();
        let before = store.clone();

        let outcome = persister.save_note(&mut store, "nope", "x");
        assert!(matches!(outcome, NoteSaveOutcome::UnknownCustomer));
        assert_eq!(store, before);
        assert_eq!(persister.storage().read_snapshot(SNAPSHOT_KEY).unwrap(), None);
    }

    #[test]
    fn reset_removes_snapshot() {
        let persister = NotePersister::new(MemorySnapshotStorage::new());
        let mut store = seed();
        persister.save_note(&mut store, "C1", "edited");

        let loaded = persister.reset(&seed());
        assert_eq!(loaded.source, StoreSource::Seed);
        assert!(loaded.issue.is_none());
        assert_eq!(loaded.store.get("C1").map(|r| r.note.as_str()), Some(""));
        assert_eq!(persister.storage().read_snapshot(SNAPSHOT_KEY).unwrap(), None);
    }
}
