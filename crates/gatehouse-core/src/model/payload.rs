use std::fmt;

use chrono::{DateTime, Local, Utc};

/// The authorized data bundle shown on the dashboard.
///
/// Opaque to the controller: it is stored and handed to the renderer as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedPayload {
    pub user_profile: UserProfile,
    pub stats: DashboardStats,
    /// Newest first, as delivered by the backend.
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    /// Ordered as delivered; rendered in this order.
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_projects: u64,
    pub completed_tasks: u64,
    pub pending_reviews: u64,
}

/// One line of the recent-activity feed. `id` is unique within a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub id: String,
    pub action: String,
    pub timestamp: ActivityTime,
    pub ip: String,
}

/// Activity timestamp: parsed when the backend sent RFC 3339, raw otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityTime {
    At(DateTime<Utc>),
    Raw(String),
}

impl ActivityTime {
    pub fn parse(raw: &str) -> Self {
        DateTime::parse_from_rfc3339(raw).map_or_else(
            |_| Self::Raw(raw.to_owned()),
            |dt| Self::At(dt.with_timezone(&Utc)),
        )
    }
}

impl fmt::Display for ActivityTime {
    /// Local time as `dd/mm/yyyy, HH:MM:SS`; unparsed values verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(dt) => write!(
                f,
                "{}",
                dt.with_timezone(&Local).format("%d/%m/%Y, %H:%M:%S")
            ),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamps() {
        let t = ActivityTime::parse("2024-06-15T10:30:00Z");
        assert!(matches!(t, ActivityTime::At(_)));
    }

    #[test]
    fn keeps_unparseable_timestamps_verbatim() {
        let t = ActivityTime::parse("yesterday");
        assert_eq!(t, ActivityTime::Raw("yesterday".into()));
        assert_eq!(t.to_string(), "yesterday");
    }
}
