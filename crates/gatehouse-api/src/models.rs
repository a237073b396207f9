// Wire types for the authentication backend.
//
// Field names follow the backend's camelCase JSON. Every collection and
// optional block defaults to empty so a partially populated payload still
// decodes; domain conversion happens in `gatehouse-core`.

use serde::Deserialize;

/// User record as returned by `/api/auth/login` and `/api/auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Body of a successful login.
///
/// Some backends call the token `accessToken`; both spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
    pub user: ApiUser,
}

/// `GET /api/auth/me` may return the user bare or wrapped in `{ "user": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum MeResponse {
    Wrapped { user: ApiUser },
    Bare(ApiUser),
}

impl MeResponse {
    pub(crate) fn into_user(self) -> ApiUser {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

/// Protected dashboard payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiProtectedData {
    pub user_profile: ApiProfile,
    pub stats: ApiStats,
    pub recent_activity: Vec<ApiActivity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiProfile {
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiStats {
    pub total_users: u64,
    pub active_projects: u64,
    pub completed_tasks: u64,
    pub pending_reviews: u64,
}

/// One entry of the recent-activity feed. `id` may be numeric or a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiActivity {
    pub id: serde_json::Value,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub ip: String,
}
