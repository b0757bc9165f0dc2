//! Credential storage
//!
//! The client keeps its bearer credentials in a small key-value store, the
//! native equivalent of the cookie jar the API was designed around. Stores
//! are synchronous; every read and write completes without suspension.

mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::error::StoreResult;

/// Store key for the short-lived bearer credential
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Store key for the long-lived refresh credential
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Store key for the CSRF token the logout endpoint expects
pub const CSRF_TOKEN_KEY: &str = "csrftoken";

/// Synchronous key-value store for auth credentials
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` if the key is unset
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a value; removing an unset key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Read the access token
    fn access_token(&self) -> StoreResult<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    /// Read the refresh token
    fn refresh_token(&self) -> StoreResult<Option<String>> {
        self.get(REFRESH_TOKEN_KEY)
    }

    /// Read the CSRF token
    fn csrf_token(&self) -> StoreResult<Option<String>> {
        self.get(CSRF_TOKEN_KEY)
    }

    /// Remove the access and refresh tokens together
    ///
    /// The two tokens are only ever valid as a pair; every logout path goes
    /// through here so a session is never left half-cleared.
    fn clear_tokens(&self) -> StoreResult<()> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}
