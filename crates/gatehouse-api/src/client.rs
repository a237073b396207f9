// Backend HTTP client
//
// Wraps `reqwest::Client` with URL construction, bearer-token injection and
// response envelope unwrapping. Endpoint groups (auth, protected data) are
// implemented as inherent methods in their own files to keep this module
// focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the authentication backend.
///
/// Holds the bearer token issued at login. Protected requests attach it as
/// `Authorization: Bearer <token>`; the token itself is never logged.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl AuthClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:3000`); API
    /// paths are joined onto it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ──────────────────────────────────────────────

    /// Install a bearer token (after login, or restored from storage).
    pub fn set_token(&self, token: SecretString) {
        debug!("storing bearer token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drop the current bearer token.
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The current bearer token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Attach the bearer token to a request, failing if none is installed.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => Ok(builder.bearer_auth(token.expose_secret())),
            None => Err(Error::NotAuthenticated),
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{}", path.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Unauthenticated POST with a JSON body (login).
    pub(crate) async fn post_public<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        Self::parse_response(resp, Unauthorized::BadCredentials).await
    }

    /// Authenticated GET.
    pub(crate) async fn get_authed<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let builder = self.authorize(self.http.get(url))?;
        let resp = builder.send().await?;
        Self::parse_response(resp, Unauthorized::SessionExpired).await
    }

    /// Authenticated POST without a body; the response body is ignored.
    pub(crate) async fn post_authed_empty(&self, url: Url) -> Result<(), Error> {
        debug!("POST {}", url);
        let builder = self.authorize(self.http.post(url))?;
        let resp = builder.send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        Ok(())
    }

    /// Map the status code, then unwrap the optional `{ success, data }`
    /// envelope and decode the payload.
    async fn parse_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        on_401: Unauthorized,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            return Err(match on_401 {
                Unauthorized::BadCredentials => Error::Authentication {
                    message: envelope_message(&body)
                        .unwrap_or_else(|| "invalid username or password".into()),
                },
                Unauthorized::SessionExpired => Error::SessionExpired,
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Api {
                status: 403,
                message: "insufficient permissions".into(),
            });
        }

        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: envelope_message(&body).unwrap_or_else(|| preview(&body).to_owned()),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

        let payload = unwrap_envelope(value, status.as_u16())?;
        trace!("decoding response payload");

        serde_json::from_value(payload).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// How a 401 should be reported for a given request kind.
#[derive(Debug, Clone, Copy)]
enum Unauthorized {
    BadCredentials,
    SessionExpired,
}

/// Strip a `{ "success": true, "data": ... }` wrapper if present.
///
/// `{ "success": false, ... }` becomes `Error::Api` carrying the envelope's
/// `message`/`error` text. Bodies without a `success` flag pass through.
fn unwrap_envelope(value: Value, status: u16) -> Result<Value, Error> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    match map.get("success").and_then(Value::as_bool) {
        Some(false) => Err(Error::Api {
            status,
            message: message_field(&map).unwrap_or_else(|| "request rejected".into()),
        }),
        Some(true) => Ok(map.remove("data").unwrap_or(Value::Object(map))),
        None => Ok(Value::Object(map)),
    }
}

fn envelope_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(map) => message_field(&map),
        _ => None,
    }
}

fn message_field(map: &serde_json::Map<String, Value>) -> Option<String> {
    map.get("message")
        .or_else(|| map.get("error"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// First 200 bytes of a body (on a char boundary) for error messages.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_with_data_is_unwrapped() {
        let value = json!({ "success": true, "data": { "a": 1 } });
        assert_eq!(unwrap_envelope(value, 200).unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn envelope_without_data_keeps_remaining_fields() {
        let value = json!({ "success": true, "token": "t" });
        let out = unwrap_envelope(value, 200).unwrap();
        assert_eq!(out["token"], "t");
    }

    #[test]
    fn failed_envelope_carries_message() {
        let value = json!({ "success": false, "error": "Token inválido" });
        match unwrap_envelope(value, 200) {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 200);
                assert_eq!(message, "Token inválido");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn bare_body_passes_through() {
        let value = json!([1, 2, 3]);
        assert_eq!(unwrap_envelope(value.clone(), 200).unwrap(), value);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let p = preview(&body);
        assert!(p.len() <= 200);
        assert!(body.starts_with(p));
    }

    #[test]
    fn api_url_joins_without_double_slashes() {
        let client = AuthClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://localhost:3000/").unwrap(),
        );
        assert_eq!(
            client.api_url("/auth/login").unwrap().as_str(),
            "http://localhost:3000/api/auth/login"
        );
    }
}
