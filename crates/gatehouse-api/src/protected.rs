// Protected data endpoints

use crate::client::AuthClient;
use crate::error::Error;
use crate::models::ApiProtectedData;

impl AuthClient {
    /// Fetch the dashboard bundle: `GET /api/protected/dashboard`.
    ///
    /// Requires a bearer token; a rejected token maps to
    /// [`Error::SessionExpired`].
    pub async fn fetch_protected_data(&self) -> Result<ApiProtectedData, Error> {
        let url = self.api_url("protected/dashboard")?;
        self.get_authed(url).await
    }
}
