//! Core domain logic for the churn triage dashboard.
//! This crate owns the customer store, prioritization, recommendations and
//! note persistence; UI shells only render what it returns.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::customer::{
    CustomerId, CustomerRecord, CustomerValidationError, Driver, DriverStatus, RiskTier,
    ACTIONABLE_MARKER, IGNORE_MARKER,
};
pub use model::store::{CustomerStore, StoreError};
pub use repo::snapshot_repo::{
    MemorySnapshotStorage, SnapshotStorage, SqliteSnapshotStorage, StorageError, StorageResult,
    UnavailableSnapshotStorage,
};
pub use seed::seed_customers;
pub use service::note_persister::{
    NotePersister, NoteSaveOutcome, PersistenceIssue, StoreLoad, StoreSource, SNAPSHOT_KEY,
};
pub use service::portfolio::{summarize, PortfolioSummary};
pub use service::prioritizer::{parse_threshold, prioritize, prioritize_input, DEFAULT_THRESHOLD};
pub use service::recommendation::{
    matched_rule, play_for, playbook, recommend, recommend_record, Play, RecommendationError,
    RecommendationRule,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds the validated seed store.
///
/// # Errors
/// - Returns `StoreError` if the compiled-in roster breaks store invariants.
pub fn seed_store() -> Result<CustomerStore, StoreError> {
    CustomerStore::try_from_records(seed_customers())
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping, seed_store};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn seed_store_is_valid() {
        assert!(seed_store().is_ok());
    }
}
