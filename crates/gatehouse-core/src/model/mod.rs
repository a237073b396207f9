// ── Domain model ──
//
// Canonical types shared by the controller and the UI. These never carry
// wire-format quirks; see `convert` for the mapping from `gatehouse_api`.

pub mod payload;
pub mod user;

pub use payload::{ActivityEntry, ActivityTime, DashboardStats, ProtectedPayload, UserProfile};
pub use user::{Session, User};
