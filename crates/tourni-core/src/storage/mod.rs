//! Durable key-value storage for session fields.
//!
//! This module provides:
//! - `Storage`: the string-keyed backend contract (get/set/remove/clear)
//! - `FileStorage`: a JSON file on disk, the default for the CLI
//! - `MemoryStorage`: an in-process map, used by tests and ephemeral sessions
//! - `PersistedStore`: the infallible wrapper the rest of the crate talks to
//!
//! Backend failures never escape `PersistedStore`; they are logged and the
//! call degrades to a no-op (writes) or an empty result (reads).

pub mod backend;
pub mod store;

pub use backend::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::PersistedStore;
