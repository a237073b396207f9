use thiserror::Error;

/// Top-level error type for the `gatehouse-api` crate.
///
/// Covers every failure mode of the backend client: authentication,
/// transport, API-level rejections, and payload decoding.
/// `gatehouse-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The bearer token was rejected by a protected endpoint.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// A protected endpoint was called before any token was installed.
    #[error("Not authenticated -- log in first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success response, or a `{"success": false}` envelope.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and logging in again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
