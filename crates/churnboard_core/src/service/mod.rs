//! Core use-case services.
//!
//! # Responsibility
//! - Turn the store into list, detail and header projections.
//! - Write note edits through to snapshot storage.
//!
//! # Invariants
//! - Prioritizer, recommendation and portfolio functions are pure.
//! - The note persister is the only writer of customer state.

pub mod note_persister;
pub mod portfolio;
pub mod prioritizer;
pub mod recommendation;
