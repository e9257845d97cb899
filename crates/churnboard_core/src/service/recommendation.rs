//! Recommendation generation from churn drivers.
//!
//! # Responsibility
//! - Pick the primary actionable driver of a customer.
//! - Map it to a canned intervention through an ordered playbook.
//!
//! # Invariants
//! - Output depends only on `name` and driver tags; no clock, no randomness.
//! - The first actionable driver wins; later ones are ignored.
//! - Playbook phrases are matched as literal, case-sensitive substrings of
//!   the stored tag, in declaration order.
//! - Malformed driver entries are skipped; a malformed customer is rejected.

use crate::model::customer::{CustomerRecord, Driver};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NAME_PLACEHOLDER: &str = "{name}";
const MONITOR_TEMPLATE: &str =
    "Monitor {name}: no actionable churn drivers are flagged. Review again at the next account health check.";
const EXECUTIVE_CHECK_IN_TEMPLATE: &str =
    "Schedule an executive check-in with {name} to review account health and uncover the root cause behind the flagged driver.";

/// One playbook entry: known driver phrase and its intervention template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationRule {
    pub phrase: &'static str,
    /// Contains `{name}` where the customer name is interpolated.
    pub template: &'static str,
}

impl RecommendationRule {
    fn render(&self, name: &str) -> String {
        render_template(self.template, name)
    }
}

const PLAYBOOK: &[RecommendationRule] = &[
    RecommendationRule {
        phrase: "Inactivity on Key Feature",
        template: "Book a guided feature walkthrough with {name} to re-engage their team with the capability they stopped using.",
    },
    RecommendationRule {
        phrase: "Low API Usage",
        template: "Offer {name} a technical integration session with a solutions engineer to lift API usage.",
    },
    RecommendationRule {
        phrase: "Billing issue",
        template: "Ask billing operations to contact {name} within one business day and resolve the open billing issue, crediting the account if needed.",
    },
    RecommendationRule {
        phrase: "Support ticket spike",
        template: "Escalate {name}'s open support tickets to a senior engineer and send a service recovery summary once they are closed.",
    },
    RecommendationRule {
        phrase: "Contract renewal approaching",
        template: "Prepare an early renewal proposal for {name} with loyalty pricing before the contract end date.",
    },
    RecommendationRule {
        phrase: "Feature adoption decline",
        template: "Enroll {name} in the adoption program and share a usage report highlighting underused features.",
    },
];

/// Returns the ordered playbook.
pub fn playbook() -> &'static [RecommendationRule] {
    PLAYBOOK
}

/// Which branch produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Play {
    /// No actionable driver present.
    Monitor,
    /// Primary actionable driver matched a playbook phrase.
    Playbook(&'static RecommendationRule),
    /// Primary actionable driver matched nothing known.
    ExecutiveCheckIn,
}

impl Play {
    /// Stable label for UI and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Playbook(rule) => rule.phrase,
            Self::ExecutiveCheckIn => "executive_check_in",
        }
    }
}

/// Invalid input to the recommendation generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    InvalidArgument(String),
}

impl Display for RecommendationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for RecommendationError {}

/// Generates a recommendation from a loosely-typed customer value.
///
/// # Errors
/// - `InvalidArgument` when `customer` is not an object, or when `name` is
///   missing/not a string, or `topDrivers` is missing/not an array.
///
/// Non-string entries inside `topDrivers` are skipped.
pub fn recommend(customer: &Value) -> Result<String, RecommendationError> {
    let object = customer.as_object().ok_or_else(|| {
        RecommendationError::InvalidArgument(format!(
            "customer must be an object, got {}",
            json_kind(customer)
        ))
    })?;

    let name = match object.get("name") {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => {
            return Err(RecommendationError::InvalidArgument(format!(
                "customer.name must be a string, got {}",
                json_kind(other)
            )));
        }
        None => {
            return Err(RecommendationError::InvalidArgument(
                "customer.name is required".to_string(),
            ));
        }
    };

    let tags = match object.get("topDrivers") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(RecommendationError::InvalidArgument(format!(
                "customer.topDrivers must be an array, got {}",
                json_kind(other)
            )));
        }
        None => {
            return Err(RecommendationError::InvalidArgument(
                "customer.topDrivers is required".to_string(),
            ));
        }
    };

    let drivers: Vec<Driver> = tags
        .iter()
        .filter_map(Value::as_str)
        .map(Driver::parse)
        .collect();
    Ok(render(name, classify(&drivers)))
}

/// Generates a recommendation for a typed record.
pub fn recommend_record(customer: &CustomerRecord) -> String {
    render(customer.name.as_str(), classify(&customer.top_drivers))
}

/// Returns the branch `recommend_record` takes for this customer.
pub fn play_for(customer: &CustomerRecord) -> Play {
    classify(&customer.top_drivers)
}

/// Returns the playbook entry matched by the primary actionable driver.
pub fn matched_rule(customer: &CustomerRecord) -> Option<&'static RecommendationRule> {
    match play_for(customer) {
        Play::Playbook(rule) => Some(rule),
        Play::Monitor | Play::ExecutiveCheckIn => None,
    }
}

fn classify(drivers: &[Driver]) -> Play {
    let Some(primary) = drivers.iter().find(|driver| driver.is_actionable()) else {
        return Play::Monitor;
    };

    PLAYBOOK
        .iter()
        .find(|rule| primary.as_tag().contains(rule.phrase))
        .map_or(Play::ExecutiveCheckIn, Play::Playbook)
}

fn render(name: &str, play: Play) -> String {
    match play {
        Play::Monitor => render_template(MONITOR_TEMPLATE, name),
        Play::Playbook(rule) => rule.render(name),
        Play::ExecutiveCheckIn => render_template(EXECUTIVE_CHECK_IN_TEMPLATE, name),
    }
}

fn render_template(template: &str, name: &str) -> String {
    template.replacen(NAME_PLACEHOLDER, name, 1)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
