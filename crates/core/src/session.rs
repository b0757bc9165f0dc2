//! Shared authentication session state

use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::watch;

/// Consecutive refresh failures tolerated before the session is torn down
pub const MAX_REFRESH_ATTEMPTS: u32 = 3;

/// Mutable authentication state shared between the client, the middleware
/// pipeline and the UI-facing helpers
///
/// The failure counter spans request chains: a failed refresh on any chain
/// counts against the same budget, and a success on any chain resets it.
/// The authenticated flag is a watch channel so navigation guards can
/// observe it without polling.
#[derive(Debug)]
pub struct AuthSession {
    failures: AtomicU32,
    max_failures: u32,
    authenticated: watch::Sender<bool>,
}

impl AuthSession {
    /// Create a session with the default failure budget
    pub fn new() -> Self {
        Self::with_budget(MAX_REFRESH_ATTEMPTS)
    }

    /// Create a session tolerating `max_failures` consecutive refresh failures
    pub fn with_budget(max_failures: u32) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            failures: AtomicU32::new(0),
            max_failures,
            authenticated,
        }
    }

    /// Record a failed refresh, returning the new consecutive-failure count
    pub fn record_failure(&self) -> u32 {
        self.failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Reset the failure counter after a successful refresh
    pub fn reset_failures(&self) {
        self.failures.store(0, Ordering::SeqCst);
    }

    /// Current consecutive-failure count
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Whether the failure budget is spent
    pub fn is_exhausted(&self) -> bool {
        self.failures() >= self.max_failures
    }

    /// Update the observable authenticated flag
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.send_replace(authenticated);
    }

    /// Current value of the authenticated flag
    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Subscribe to authenticated-flag changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
