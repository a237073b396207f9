//! All possible UI actions. Actions are the sole mechanism for state mutation.

use gatehouse_core::{DashboardView, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Lifecycle ────────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ───────────────────────────────────────────────────
    /// Switch to the view for this route (issued by the navigator).
    Navigate(Route),

    // ── Login ────────────────────────────────────────────────────────
    LoginSucceeded,
    LoginFailed(String),

    // ── Dashboard ────────────────────────────────────────────────────
    /// Fresh controller state joined with the session user.
    DashboardUpdated(DashboardView),
    Reload,
    Logout,
    DismissError,
}
