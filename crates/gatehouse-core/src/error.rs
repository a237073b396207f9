// ── Core error types ──
//
// User-facing errors from gatehouse-core. These are NOT transport-specific:
// consumers never see raw status codes or JSON parse failures directly.
// The `From<gatehouse_api::Error>` impl translates them into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not logged in")]
    NotAuthenticated,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the session should be considered gone after this error.
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gatehouse_api::Error> for CoreError {
    fn from(err: gatehouse_api::Error) -> Self {
        match err {
            gatehouse_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            gatehouse_api::Error::SessionExpired => CoreError::SessionExpired,
            gatehouse_api::Error::NotAuthenticated => CoreError::NotAuthenticated,
            gatehouse_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            gatehouse_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            gatehouse_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            gatehouse_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            gatehouse_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response from backend: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_display_their_message_verbatim() {
        let err: CoreError = gatehouse_api::Error::Api {
            status: 500,
            message: "Error al obtener datos".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Error al obtener datos");
    }

    #[test]
    fn expired_sessions_end_the_session() {
        let err: CoreError = gatehouse_api::Error::SessionExpired.into();
        assert!(err.ends_session());
        let err: CoreError = gatehouse_api::Error::Tls("bad".into()).into();
        assert!(!err.ends_session());
    }
}
