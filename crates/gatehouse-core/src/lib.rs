//! Session-gated data layer between `gatehouse-api` and UI consumers.
//!
//! This crate owns the domain model and the one stateful piece of the
//! workspace, the dashboard controller:
//!
//! - **[`DashboardController`]** — Owns the dashboard's `loading` / `error` /
//!   `data` state. [`mount()`](DashboardController::mount) gates on the
//!   session flag (redirecting to [`LOGIN_ROUTE`] when absent) and issues the
//!   initial load; [`reload()`](DashboardController::reload) repeats it.
//!   Every load is tagged with a sequence number so out-of-order completions
//!   never overwrite newer results, and
//!   [`unmount()`](DashboardController::unmount) discards anything still in
//!   flight.
//!
//! - **[`SessionProvider`]** — The seam to whatever owns authentication.
//!   [`ApiSession`] is the production implementation backed by
//!   [`gatehouse_api::AuthClient`]; tests substitute scripted fakes.
//!
//! - **[`Navigator`]** — Fire-and-forget route changes, implemented by the UI.
//!
//! - **Domain model** ([`model`]) — `User`, `Session`, `ProtectedPayload` and
//!   friends, converted from the backend's wire types in [`convert`].

pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod navigator;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BackendConfig, TlsVerification};
pub use dashboard::{DashboardController, DashboardState, DashboardStream, DashboardView, ViewMode};
pub use error::CoreError;
pub use navigator::{DASHBOARD_ROUTE, LOGIN_ROUTE, Navigator, Route};
pub use session::{ApiSession, FetchFailure, FetchResult, SessionProvider};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ActivityEntry, ActivityTime, DashboardStats, ProtectedPayload, Session, User, UserProfile,
};
