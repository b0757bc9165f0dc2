//! Prominent Profiles HTTP client
//!
//! Wraps `reqwest` with a small middleware pipeline: the stored bearer
//! credential is attached to every outgoing request, and an authorization
//! failure triggers one transparent credential exchange followed by a single
//! replay. Consecutive refresh failures are bounded; spending the budget
//! tears the session down and routes to the login surface.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod refresh;
pub mod types;

pub use auth::AuthState;
pub use client::{ProfilesClient, ProfilesClientBuilder};
pub use error::ClientError;
pub use refresh::{RefreshError, TokenRefresher};
