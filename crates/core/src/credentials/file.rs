//! File-backed credential store

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::CredentialStore;
use crate::error::{StoreError, StoreResult};

/// Default storage path relative to the home directory.
const CREDENTIAL_STORAGE_PATH: &str = ".prominent_profiles/credentials.json";

/// Credential store persisted as a JSON file
///
/// The native stand-in for the browser cookie jar: values survive restarts.
/// Every mutation is written through to disk.
pub struct FileCredentialStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at the default location under the home directory
    pub fn open_default() -> StoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| StoreError::io("could not determine home directory"))?;
        Self::open(home.join(CREDENTIAL_STORAGE_PATH))
    }

    /// Open a store at `path`, loading any existing contents
    ///
    /// A missing file is treated as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| StoreError::io("credential store lock poisoned"))
    }

    fn persist(&self, values: &HashMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, &contents)?;

        // Owner read/write only; the file holds live credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.lock()?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.lock()?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.lock()?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
