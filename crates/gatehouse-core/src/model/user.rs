use std::collections::BTreeSet;

/// An authenticated user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub email: String,
    /// Role names. Ordered so the UI renders chips deterministically.
    pub roles: BTreeSet<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Upper-cased first character of the username, for avatar placeholders.
    pub fn initial(&self) -> Option<char> {
        self.username.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

/// Authentication state owned by a [`SessionProvider`](crate::SessionProvider).
///
/// The dashboard controller only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

impl Session {
    pub fn authenticated(user: User) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}
