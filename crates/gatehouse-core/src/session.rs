// ── Session provider seam ──
//
// Whatever owns authentication state implements `SessionProvider`. The
// dashboard controller reads the session, watches its `is_authenticated`
// flag, fetches the protected payload and asks for logout, all through
// this trait. `ApiSession` is the implementation backed by the HTTP client.

use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use gatehouse_api::AuthClient;

use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::model::{ProtectedPayload, Session, User};

/// A failed protected-data fetch. The message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<CoreError> for FetchFailure {
    fn from(err: CoreError) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of one fetch attempt.
pub type FetchResult = Result<Arc<ProtectedPayload>, FetchFailure>;

/// Owner of authentication state and the protected-data fetch.
pub trait SessionProvider: Send + Sync + 'static {
    /// Current session snapshot.
    fn session(&self) -> Session;

    /// Observe session transitions.
    fn subscribe(&self) -> watch::Receiver<Session>;

    /// Fetch the protected payload for the current session.
    fn fetch_protected_data(&self) -> impl Future<Output = FetchResult> + Send;

    /// End the session. Never fails: problems are logged and local state is
    /// cleared regardless.
    fn logout(&self) -> impl Future<Output = ()> + Send;
}

// ── ApiSession ──────────────────────────────────────────────────────

/// [`SessionProvider`] backed by [`AuthClient`].
pub struct ApiSession {
    client: AuthClient,
    session: watch::Sender<Session>,
}

impl ApiSession {
    /// Build a client for `config` and start unauthenticated.
    pub fn new(config: &BackendConfig) -> Result<Self, CoreError> {
        let client = AuthClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: AuthClient) -> Self {
        let (session, _) = watch::channel(Session::anonymous());
        Self { client, session }
    }

    /// Log in with username/password and publish the authenticated session.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, CoreError> {
        let user: User = self.client.login(username, password).await?.into();
        info!(username = %user.username, "logged in");
        self.session.send_replace(Session::authenticated(user.clone()));
        Ok(user)
    }

    /// Resume a session from a previously issued token.
    ///
    /// The token is verified against the backend; if it is rejected the
    /// client forgets it and the session stays unauthenticated.
    pub async fn restore(&self, token: SecretString) -> Result<User, CoreError> {
        self.client.set_token(token);
        match self.client.me().await {
            Ok(user) => {
                let user: User = user.into();
                info!(username = %user.username, "session restored");
                self.session.send_replace(Session::authenticated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                debug!(error = %e, "saved session rejected");
                self.client.clear_token();
                Err(e.into())
            }
        }
    }

    /// The bearer token of the current session, for persistence.
    pub fn token(&self) -> Option<SecretString> {
        self.client.token()
    }

    fn end_session(&self) {
        self.client.clear_token();
        self.session.send_if_modified(|s| {
            if !s.is_authenticated && s.user.is_none() {
                return false;
            }
            *s = Session::anonymous();
            true
        });
    }
}

impl SessionProvider for ApiSession {
    fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    async fn fetch_protected_data(&self) -> FetchResult {
        match self.client.fetch_protected_data().await {
            Ok(data) => Ok(Arc::new(data.into())),
            Err(e) => {
                if e.is_auth_expired() {
                    info!("session no longer valid, clearing it");
                    self.end_session();
                }
                Err(CoreError::from(e).into())
            }
        }
    }

    async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "backend logout failed, clearing local session anyway");
        }
        self.end_session();
        info!("logged out");
    }
}
