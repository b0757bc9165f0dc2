//! In-memory credential store

use std::collections::HashMap;
use std::sync::RwLock;

use super::CredentialStore;
use crate::error::{StoreError, StoreResult};

/// Process-local credential store backed by a `HashMap`
///
/// The default store when nothing else is configured; values do not survive
/// the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| StoreError::io("credential store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StoreError::io("credential store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| StoreError::io("credential store lock poisoned"))?;
        values.remove(key);
        Ok(())
    }
}
