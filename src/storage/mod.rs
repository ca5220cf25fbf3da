//! Durable string-keyed storage for client-side state.
//!
//! This plays the role browser local storage plays for a web client: a single
//! shared cell per key with last-writer-wins semantics and no transactions.

mod file;
mod memory;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value store used to persist the admin session between runs.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key succeeds.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the entry cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: LocalStore + ?Sized> LocalStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Keys double as file names, so only `[A-Za-z0-9_-]` is accepted.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
