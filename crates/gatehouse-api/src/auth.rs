// Backend authentication
//
// Username/password login issuing a bearer token, token verification via
// `/api/auth/me`, and logout. The issued token is installed on the client so
// subsequent protected requests carry it automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::AuthClient;
use crate::error::Error;
use crate::models::{ApiUser, LoginResponse, MeResponse};

impl AuthClient {
    /// Authenticate with username/password: `POST /api/auth/login`.
    ///
    /// On success the returned token is installed on this client and the
    /// authenticated user is returned.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<ApiUser, Error> {
        let url = self.api_url("auth/login")?;
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp: LoginResponse = self.post_public(url, &body).await?;
        if resp.token.is_empty() {
            return Err(Error::Authentication {
                message: "login response did not include a token".into(),
            });
        }
        self.set_token(SecretString::from(resp.token));

        debug!("login successful");
        Ok(resp.user)
    }

    /// Verify the installed token and fetch its user: `GET /api/auth/me`.
    pub async fn me(&self) -> Result<ApiUser, Error> {
        let url = self.api_url("auth/me")?;
        let resp: MeResponse = self.get_authed(url).await?;
        Ok(resp.into_user())
    }

    /// End the current session: `POST /api/auth/logout`.
    ///
    /// The local token is dropped whether or not the backend call succeeds;
    /// the backend result is still returned so callers can log it.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.api_url("auth/logout")?;
        debug!("logging out at {}", url);

        let result = self.post_authed_empty(url).await;
        self.clear_token();

        debug!("logout complete");
        result
    }
}
