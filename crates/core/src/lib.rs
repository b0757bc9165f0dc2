//! Core credential storage and session state for the Prominent Profiles client

pub mod credentials;
pub mod error;
pub mod navigation;
pub mod session;

pub use credentials::{
    ACCESS_TOKEN_KEY, CSRF_TOKEN_KEY, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    REFRESH_TOKEN_KEY,
};
pub use error::{StoreError, StoreResult};
pub use navigation::{Navigator, NoopNavigator, Surface};
pub use session::{AuthSession, MAX_REFRESH_ATTEMPTS};
