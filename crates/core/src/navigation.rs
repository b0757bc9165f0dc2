//! Navigation surfaces and the router collaborator

/// Logical destinations the auth flow can route to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The login page
    Login,
    /// The authenticated dashboard
    Dashboard,
}

impl Surface {
    /// Route path understood by the application router
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
        }
    }
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Router collaborator invoked for auth-driven redirects
pub trait Navigator: Send + Sync {
    /// Navigate to the given surface
    fn navigate(&self, surface: Surface);
}

/// Navigator that ignores every redirect
///
/// The default for headless tools that drive the client without a UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _surface: Surface) {}
}
