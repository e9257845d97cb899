//! Storage abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key/value contract the note persister writes through.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Backends store opaque string values; they never parse snapshots.

pub mod snapshot_repo;
