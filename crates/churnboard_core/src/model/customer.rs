//! Customer domain model.
//!
//! # Responsibility
//! - Define the canonical account record rendered by the dashboard.
//! - Parse churn driver tags into typed status instead of inline markup.
//!
//! # Invariants
//! - `lifetime_value` is finite and strictly positive.
//! - `risk_score` is finite and within `[0, 100]`.
//! - Driver order is significant: the first actionable driver is primary.
//!
//! # See also
//! - service/recommendation.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Marker flagging a driver that has a templated play.
pub const ACTIONABLE_MARKER: &str = "[Actionable]";
/// Marker flagging a driver the account team chose to ignore.
pub const IGNORE_MARKER: &str = "[Ignore]";

const RISK_SCORE_MIN: f64 = 0.0;
const RISK_SCORE_MAX: f64 = 100.0;
const HIGH_RISK_FLOOR: f64 = 70.0;
const MEDIUM_RISK_FLOOR: f64 = 40.0;

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:Actionable|Ignore)\]").expect("valid marker regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier of one tracked account, e.g. `C1`.
pub type CustomerId = String;

/// Triage status carried by one churn driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    /// A templated recommendation exists for this driver.
    Actionable,
    /// Suppressed by the account team.
    Ignored,
    /// Informational only.
    Neutral,
}

/// One contributing factor to a customer's churn risk.
///
/// Stored on the wire as the original tag string; `label` and `status` are
/// derived views and never written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Driver {
    label: String,
    status: DriverStatus,
    raw: String,
}

impl Driver {
    /// Creates a driver from an already-clean label, rendering a canonical tag.
    pub fn new(label: impl Into<String>, status: DriverStatus) -> Self {
        let label = label.into();
        let raw = match status {
            DriverStatus::Actionable => format!("{label} {ACTIONABLE_MARKER}"),
            DriverStatus::Ignored => format!("{label} {IGNORE_MARKER}"),
            DriverStatus::Neutral => label.clone(),
        };
        Self { label, status, raw }
    }

    /// Parses a raw tag string, keeping it verbatim.
    ///
    /// `[Actionable]` takes precedence over `[Ignore]` when both are present.
    pub fn parse(tag: &str) -> Self {
        let status = if tag.contains(ACTIONABLE_MARKER) {
            DriverStatus::Actionable
        } else if tag.contains(IGNORE_MARKER) {
            DriverStatus::Ignored
        } else {
            DriverStatus::Neutral
        };

        let stripped = MARKER_RE.replace_all(tag, " ");
        let label = WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned();
        Self {
            label,
            status,
            raw: tag.to_string(),
        }
    }

    /// The tag exactly as stored.
    pub fn as_tag(&self) -> &str {
        self.raw.as_str()
    }

    /// Display text with status markers stripped.
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn is_actionable(&self) -> bool {
        self.status == DriverStatus::Actionable
    }
}

impl From<String> for Driver {
    fn from(value: String) -> Self {
        let mut driver = Self::parse(value.as_str());
        driver.raw = value;
        driver
    }
}

impl From<&str> for Driver {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Driver> for String {
    fn from(value: Driver) -> Self {
        value.raw
    }
}

/// Coarse risk band used for list colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// Stable lowercase label for UI and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Canonical record for one tracked account.
///
/// Field names on the wire follow the dashboard's persisted layout
/// (`lifetimeValue`, `riskScore`, `topDrivers`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: CustomerId,
    /// Free-form display name. Echoed, never interpreted.
    pub name: String,
    /// Monetary estimate, strictly positive.
    pub lifetime_value: f64,
    /// Churn risk in `[0, 100]`.
    pub risk_score: f64,
    pub top_drivers: Vec<Driver>,
    /// Intervention log. Only field mutated after creation.
    #[serde(default)]
    pub note: String,
}

impl CustomerRecord {
    /// Creates a record with an empty note from raw driver tags.
    pub fn new(
        id: impl Into<CustomerId>,
        name: impl Into<String>,
        lifetime_value: f64,
        risk_score: f64,
        tags: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lifetime_value,
            risk_score,
            top_drivers: tags.iter().map(|tag| Driver::parse(tag)).collect(),
            note: String::new(),
        }
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        if self.id.trim().is_empty() {
            return Err(CustomerValidationError::EmptyId);
        }
        if !self.lifetime_value.is_finite() || self.lifetime_value <= 0.0 {
            return Err(CustomerValidationError::NonPositiveLifetimeValue {
                id: self.id.clone(),
                value: self.lifetime_value,
            });
        }
        if !self.risk_score.is_finite()
            || self.risk_score < RISK_SCORE_MIN
            || self.risk_score > RISK_SCORE_MAX
        {
            return Err(CustomerValidationError::RiskScoreOutOfRange {
                id: self.id.clone(),
                value: self.risk_score,
            });
        }
        Ok(())
    }

    /// First actionable driver in declared order.
    pub fn primary_actionable_driver(&self) -> Option<&Driver> {
        self.top_drivers.iter().find(|driver| driver.is_actionable())
    }

    pub fn risk_tier(&self) -> RiskTier {
        if self.risk_score >= HIGH_RISK_FLOOR {
            RiskTier::High
        } else if self.risk_score >= MEDIUM_RISK_FLOOR {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

/// Record-level invariant violations.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerValidationError {
    EmptyId,
    NonPositiveLifetimeValue { id: CustomerId, value: f64 },
    RiskScoreOutOfRange { id: CustomerId, value: f64 },
}

impl Display for CustomerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "customer id must not be empty"),
            Self::NonPositiveLifetimeValue { id, value } => write!(
                f,
                "customer `{id}` lifetimeValue must be a positive number, got {value}"
            ),
            Self::RiskScoreOutOfRange { id, value } => write!(
                f,
                "customer `{id}` riskScore must be within [0, 100], got {value}"
            ),
        }
    }
}

impl Error for CustomerValidationError {}
