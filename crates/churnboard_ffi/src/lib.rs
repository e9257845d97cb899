//! Flutter-facing bindings for the churn triage dashboard.

pub mod api;
