// ── Runtime backend configuration ──
//
// These types describe *how* to reach the authentication backend. They
// carry connection tuning but never touch disk: the TUI (via
// gatehouse-config) constructs a `BackendConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use gatehouse_api::{TlsMode, TransportConfig};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend root URL (e.g., `http://localhost:3000`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
