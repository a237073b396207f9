// ── API-to-domain type conversions ──
//
// Bridges raw `gatehouse_api` response types into canonical
// `gatehouse_core::model` types. Each `From` impl normalizes field names,
// parses strings into strong types, and fills defaults for missing data.

use serde_json::Value;

use gatehouse_api::{ApiActivity, ApiProfile, ApiProtectedData, ApiStats, ApiUser};

use crate::model::{
    ActivityEntry, ActivityTime, DashboardStats, ProtectedPayload, User, UserProfile,
};

/// Activity ids arrive as numbers or strings; both become strings.
fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Treat empty strings as absent.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

impl From<ApiUser> for User {
    fn from(u: ApiUser) -> Self {
        Self {
            username: u.username,
            email: u.email,
            roles: u.roles.into_iter().collect(),
        }
    }
}

impl From<ApiProfile> for UserProfile {
    fn from(p: ApiProfile) -> Self {
        Self {
            full_name: non_empty(p.full_name),
            avatar: non_empty(p.avatar),
            permissions: p.permissions,
        }
    }
}

impl From<ApiStats> for DashboardStats {
    fn from(s: ApiStats) -> Self {
        Self {
            total_users: s.total_users,
            active_projects: s.active_projects,
            completed_tasks: s.completed_tasks,
            pending_reviews: s.pending_reviews,
        }
    }
}

impl From<ApiActivity> for ActivityEntry {
    fn from(a: ApiActivity) -> Self {
        Self {
            id: id_to_string(&a.id),
            timestamp: ActivityTime::parse(&a.timestamp),
            action: a.action,
            ip: a.ip,
        }
    }
}

impl From<ApiProtectedData> for ProtectedPayload {
    fn from(d: ApiProtectedData) -> Self {
        Self {
            user_profile: d.user_profile.into(),
            stats: d.stats.into(),
            recent_activity: d.recent_activity.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn user_roles_are_deduplicated() {
        let user: User = ApiUser {
            username: "ana".into(),
            email: "ana@example.test".into(),
            roles: vec!["user".into(), "admin".into(), "user".into()],
        }
        .into();

        assert_eq!(user.roles.len(), 2);
        assert!(user.has_role("admin"));
        assert_eq!(user.initial(), Some('A'));
    }

    #[test]
    fn numeric_activity_ids_become_strings() {
        let entry: ActivityEntry = ApiActivity {
            id: json!(17),
            action: "Login".into(),
            timestamp: "2024-06-15T10:30:00Z".into(),
            ip: "10.0.0.1".into(),
        }
        .into();

        assert_eq!(entry.id, "17");
        assert!(matches!(entry.timestamp, ActivityTime::At(_)));
    }

    #[test]
    fn blank_profile_fields_are_absent() {
        let profile: UserProfile = ApiProfile {
            full_name: Some("  ".into()),
            avatar: None,
            permissions: vec!["read".into()],
        }
        .into();

        assert_eq!(profile.full_name, None);
        assert_eq!(profile.permissions, vec!["read".to_owned()]);
    }
}
