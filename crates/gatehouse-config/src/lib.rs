//! Configuration for the gatehouse client.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! session-token storage in the system keyring, and translation to
//! `gatehouse_core::BackendConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use gatehouse_core::{BackendConfig, TlsVerification};

const KEYRING_SERVICE: &str = "gatehouse";
const ENV_PREFIX: &str = "GATEHOUSE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile name to use: explicit choice, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(String::from)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// Backend base URL (e.g., "http://localhost:3000").
    pub url: String,

    /// Login username.
    pub username: Option<String>,

    /// Login password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout in seconds.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "gatehouse", "gatehouse").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gatehouse");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config layered as defaults, then `path`, then `GATEHOUSE_*` env
/// vars (nested keys separated by `__`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution ───────────────────────────────────────────

/// Username from the profile, falling back to `GATEHOUSE_USERNAME`.
pub fn resolve_username(profile: &Profile) -> Option<String> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("GATEHOUSE_USERNAME").ok())
}

/// Resolve the login password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var("GATEHOUSE_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Session token storage ───────────────────────────────────────────

fn session_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/session"),
    )?)
}

/// The bearer token saved by the last login on this profile, if any.
pub fn load_session_token(profile_name: &str) -> Option<SecretString> {
    let token = session_entry(profile_name).ok()?.get_password().ok()?;
    Some(SecretString::from(token))
}

pub fn store_session_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    session_entry(profile_name)?.set_password(token.expose_secret())?;
    debug!(profile = profile_name, "session token stored");
    Ok(())
}

/// Forget the saved token. A missing entry is not an error.
pub fn clear_session_token(profile_name: &str) -> Result<(), ConfigError> {
    match session_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `BackendConfig` from a profile, applying global defaults for
/// anything the profile leaves unset.
pub fn profile_to_backend_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<BackendConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(BackendConfig { url, tls, timeout })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_profiles_from_toml() {
        let (_dir, path) = write_config(
            r#"
default_profile = "staging"

[defaults]
timeout = 10

[profiles.staging]
url = "https://staging.example.test"
username = "ana"
insecure = true
"#,
        );

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.active_profile_name(None), "staging");
        assert_eq!(config.defaults.timeout, 10);
        let profile = config.profile("staging").unwrap();
        assert_eq!(profile.username.as_deref(), Some("ana"));
        assert_eq!(profile.insecure, Some(true));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.active_profile_name(None), "default");
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn explicit_profile_wins_over_default() {
        let config = Config::default();
        assert_eq!(config.active_profile_name(Some("prod")), "prod");
    }

    #[test]
    fn plaintext_password_loads_from_toml() {
        let (_dir, path) = write_config(
            r#"
[profiles.default]
url = "http://localhost:3000"
username = "ana"
password = "hunter2"
"#,
        );

        let config = load_config_from(&path).unwrap();
        let profile = config.profile("default").unwrap();

        assert_eq!(profile.password.as_deref(), Some("hunter2"));
        assert_eq!(resolve_username(profile).as_deref(), Some("ana"));
    }

    #[test]
    fn backend_config_uses_profile_overrides() {
        let profile = Profile {
            url: "https://api.example.test".into(),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            timeout: Some(5),
            ..Profile::default()
        };

        let backend = profile_to_backend_config(&profile, &Defaults::default()).unwrap();

        assert_eq!(backend.url.as_str(), "https://api.example.test/");
        assert_eq!(backend.tls, TlsVerification::CustomCa("/etc/ca.pem".into()));
        assert_eq!(backend.timeout, Duration::from_secs(5));
    }

    #[test]
    fn backend_config_falls_back_to_defaults() {
        let profile = Profile {
            url: "http://localhost:3000".into(),
            ..Profile::default()
        };
        let defaults = Defaults {
            insecure: true,
            timeout: 12,
        };

        let backend = profile_to_backend_config(&profile, &defaults).unwrap();

        assert_eq!(backend.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(backend.timeout, Duration::from_secs(12));
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let profile = Profile {
            url: "not a url".into(),
            ..Profile::default()
        };

        let err = profile_to_backend_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = Profile {
            url: "http://localhost:3000".into(),
            password: Some("secret".into()),
            ..Profile::default()
        };
        // Env and keyring may be populated on a developer machine, so only
        // assert that some password resolves.
        assert!(resolve_password(&profile, "gatehouse-test-profile").is_ok());
    }
}
