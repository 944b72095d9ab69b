//! Persistence
//!
//! A key-value capability the engine saves through, two stores that
//! implement it, and the save slot that layers the in-memory fallback and
//! legacy-record import on top.
//!
//! ## Module Structure
//!
//! - `store`: `FileStore` (one JSON file per key) and `MemoryStore`
//! - `slot`: `SaveSlot`, primary and legacy keys, degraded saves

pub mod store;
pub mod slot;

use thiserror::Error;

pub use store::{FileStore, MemoryStore};
pub use slot::{SaveSlot, SaveStatus, LEGACY_KEYS, PRIMARY_KEY};

/// Errors from a persistence backend.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Backend I/O failed.
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("invalid record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key cannot be mapped onto the backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Backend refuses writes.
    #[error("storage is read-only")]
    ReadOnly,
}

/// Key-value storage for serialized state.
pub trait Persistence {
    /// Read a record. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write a record, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}
