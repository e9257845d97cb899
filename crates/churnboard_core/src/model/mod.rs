//! Domain model for churn triage.
//!
//! # Responsibility
//! - Define the customer record shape shared by list, detail and persistence.
//! - Own the in-memory store and its identity invariants.
//!
//! # Invariants
//! - Every customer is identified by a stable, store-unique `CustomerId`.
//! - `note` is the only field mutated after a record is created.

pub mod customer;
pub mod store;
