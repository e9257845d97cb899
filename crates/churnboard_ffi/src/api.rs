//! FFI use-case API for the dashboard UI shell.
//!
//! # Responsibility
//! - Expose list, detail, note and reset use-cases to Dart via FRB.
//! - Hold the session store for the lifetime of the UI process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage failures surface as `ok=false` envelopes, never as errors.
//! - Free-form fields are returned unescaped; rendering must escape them.

use churnboard_core::db::open_db;
use churnboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_threshold,
    ping as ping_inner, play_for, prioritize, recommend, recommend_record, seed_store, summarize,
    CustomerRecord, CustomerStore, NotePersister, NoteSaveOutcome, PortfolioSummary,
    SnapshotStorage, SqliteSnapshotStorage, UnavailableSnapshotStorage,
};
use log::{error, warn};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

const DASHBOARD_DB_FILE_NAME: &str = "churnboard.sqlite3";
const DASHBOARD_DB_PATH_ENV: &str = "CHURNBOARD_DB_PATH";
static DASHBOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION_STORE: Mutex<Option<CustomerStore>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the prioritized list.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerListItem {
    pub customer_id: String,
    pub name: String,
    pub lifetime_value: f64,
    pub risk_score: f64,
    /// `high|medium|low`.
    pub risk_tier: String,
    pub has_note: bool,
}

/// Header figures computed over the visible list.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub customer_count: u32,
    pub high_risk_count: u32,
    pub actionable_count: u32,
    pub total_lifetime_value: f64,
    pub value_at_risk: f64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardListResponse {
    pub items: Vec<CustomerListItem>,
    /// Threshold actually applied after fallback.
    pub applied_threshold: f64,
    pub summary: DashboardSummary,
    pub message: String,
}

/// Detail modal payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetail {
    pub item: CustomerListItem,
    /// Driver tags in stored order, markers included.
    pub top_drivers: Vec<String>,
    pub note: String,
    pub recommendation: String,
    /// Playbook phrase, `monitor` or `executive_check_in`.
    pub play: String,
}

/// Detail response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetailResponse {
    pub detail: Option<CustomerDetail>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Lists customers at or above `threshold`, highest risk first.
///
/// # FFI contract
/// - `threshold` is raw text-field input; invalid values use the default.
/// - Serves seed data when local storage cannot be opened.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_list(threshold: String) -> DashboardListResponse {
    list_in(&SessionContext::process(), threshold.as_str())
}

/// Returns one customer with its recommendation.
#[flutter_rust_bridge::frb(sync)]
pub fn customer_detail(customer_id: String) -> CustomerDetailResponse {
    detail_in(&SessionContext::process(), customer_id.as_str())
}

/// Saves an intervention note and mirrors the store to disk.
///
/// # FFI contract
/// - Note text is stored verbatim.
/// - Unknown ids return `ok=false` and change nothing.
/// - A failed write keeps the edit in the session store.
#[flutter_rust_bridge::frb(sync)]
pub fn customer_save_note(customer_id: String, note: String) -> ActionResponse {
    save_note_in(&SessionContext::process(), customer_id.as_str(), note)
}

/// Clears saved notes and restores the seed roster.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_reset() -> ActionResponse {
    reset_in(&SessionContext::process())
}

/// Generates a recommendation for a raw customer JSON object.
///
/// Used by UI previews that hold unsaved customer payloads.
#[flutter_rust_bridge::frb(sync)]
pub fn recommendation_preview(customer_json: String) -> ActionResponse {
    let value = match serde_json::from_str::<serde_json::Value>(customer_json.as_str()) {
        Ok(value) => value,
        Err(err) => return ActionResponse::failure(format!("invalid customer json: {err}")),
    };
    match recommend(&value) {
        Ok(text) => ActionResponse::success(text),
        Err(err) => ActionResponse::failure(err.to_string()),
    }
}

/// Storage location plus the in-memory store it backs.
struct SessionContext<'a> {
    db_path: PathBuf,
    store: &'a Mutex<Option<CustomerStore>>,
}

impl SessionContext<'static> {
    fn process() -> Self {
        Self {
            db_path: resolve_dashboard_db_path(),
            store: &SESSION_STORE,
        }
    }
}

fn list_in(session: &SessionContext<'_>, threshold: &str) -> DashboardListResponse {
    let applied_threshold = parse_threshold(threshold);
    let result = with_session(session, |store, _| {
        let visible = prioritize(store.records(), applied_threshold);
        let summary = summarize(visible.iter().copied());
        let items = visible
            .into_iter()
            .map(to_list_item)
            .collect::<Vec<_>>();
        (items, summary)
    });

    let (items, summary, message) = match result {
        Ok((items, summary)) => {
            let message = if items.is_empty() {
                "No customers above threshold.".to_string()
            } else {
                format!("Showing {} customer(s).", items.len())
            };
            (items, summary, message)
        }
        Err(err) => (
            Vec::new(),
            PortfolioSummary::default(),
            format!("dashboard_list failed: {err}"),
        ),
    };

    DashboardListResponse {
        items,
        applied_threshold,
        summary: DashboardSummary {
            customer_count: saturating_u32(summary.customer_count),
            high_risk_count: saturating_u32(summary.high_risk_count),
            actionable_count: saturating_u32(summary.actionable_count),
            total_lifetime_value: summary.total_lifetime_value,
            value_at_risk: summary.value_at_risk,
        },
        message,
    }
}

fn detail_in(session: &SessionContext<'_>, customer_id: &str) -> CustomerDetailResponse {
    let customer_id = customer_id.trim();
    match with_session(session, |store, _| store.get(customer_id).map(to_detail)) {
        Ok(Some(detail)) => CustomerDetailResponse {
            detail: Some(detail),
            message: String::new(),
        },
        Ok(None) => CustomerDetailResponse {
            detail: None,
            message: format!("customer not found: {customer_id}"),
        },
        Err(err) => CustomerDetailResponse {
            detail: None,
            message: format!("customer_detail failed: {err}"),
        },
    }
}

fn save_note_in(session: &SessionContext<'_>, customer_id: &str, note: String) -> ActionResponse {
    let customer_id = customer_id.trim();
    let result = with_session(session, |store, persister| {
        persister.save_note(store, customer_id, note)
    });

    match result {
        Ok(NoteSaveOutcome::Saved) => ActionResponse::success("Note saved."),
        Ok(NoteSaveOutcome::UnknownCustomer) => {
            ActionResponse::failure(format!("customer not found: {customer_id}"))
        }
        Ok(NoteSaveOutcome::NotPersisted(issue)) => ActionResponse::failure(format!(
            "Note kept for this session but not saved: {issue}"
        )),
        Err(err) => ActionResponse::failure(format!("customer_save_note failed: {err}")),
    }
}

fn reset_in(session: &SessionContext<'_>) -> ActionResponse {
    let result = with_session(session, |store, persister| {
        let seed = store_seed()?;
        let loaded = persister.reset(&seed);
        *store = loaded.store;
        Ok::<_, String>(loaded.issue.map(|issue| issue.to_string()))
    });

    match result {
        Ok(Ok(None)) => ActionResponse::success("Dashboard reset."),
        Ok(Ok(Some(issue))) => {
            ActionResponse::failure(format!("Dashboard reset in memory only: {issue}"))
        }
        Ok(Err(err)) | Err(err) => ActionResponse::failure(format!("dashboard_reset failed: {err}")),
    }
}

fn resolve_dashboard_db_path() -> PathBuf {
    DASHBOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DASHBOARD_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DASHBOARD_DB_FILE_NAME)
        })
        .clone()
}

fn store_seed() -> Result<CustomerStore, String> {
    seed_store().map_err(|err| format!("seed roster invalid: {err}"))
}

/// Runs `f` against the session store.
///
/// Storage that cannot be opened is replaced by `UnavailableSnapshotStorage`;
/// the persister then serves seed data and keeps edits in memory.
fn with_session<T>(
    session: &SessionContext<'_>,
    f: impl FnOnce(&mut CustomerStore, &NotePersister<Box<dyn SnapshotStorage + '_>>) -> T,
) -> Result<T, String> {
    let conn = open_db(&session.db_path);
    let storage: Box<dyn SnapshotStorage + '_> = match conn.as_ref() {
        Ok(conn) => match SqliteSnapshotStorage::try_new(conn) {
            Ok(storage) => Box::new(storage),
            Err(err) => degraded_storage(format!("dashboard storage init failed: {err}")),
        },
        Err(err) => degraded_storage(format!("dashboard DB open failed: {err}")),
    };
    let persister = NotePersister::new(storage);

    let mut guard = session
        .store
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        let seed = store_seed()?;
        let loaded = persister.load_store(&seed);
        if let Some(issue) = loaded.issue.as_ref() {
            error!(
                "event=session_load module=ffi status=degraded error_code={} error={}",
                issue.code(),
                issue
            );
        }
        *guard = Some(loaded.store);
    }

    match guard.as_mut() {
        Some(store) => Ok(f(store, &persister)),
        None => Err("session store unavailable".to_string()),
    }
}

fn degraded_storage(reason: String) -> Box<dyn SnapshotStorage + 'static> {
    warn!("event=session_storage module=ffi status=degraded error={reason}");
    Box::new(UnavailableSnapshotStorage::new(reason))
}

fn to_list_item(record: &CustomerRecord) -> CustomerListItem {
    CustomerListItem {
        customer_id: record.id.clone(),
        name: record.name.clone(),
        lifetime_value: record.lifetime_value,
        risk_score: record.risk_score,
        risk_tier: record.risk_tier().as_str().to_string(),
        has_note: !record.note.trim().is_empty(),
    }
}

fn to_detail(record: &CustomerRecord) -> CustomerDetail {
    CustomerDetail {
        item: to_list_item(record),
        top_drivers: record.top_drivers.iter().map(|driver| driver.as_tag().to_string()).collect(),
        note: record.note.clone(),
        recommendation: recommend_record(record),
        play: play_for(record).label().to_string(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
