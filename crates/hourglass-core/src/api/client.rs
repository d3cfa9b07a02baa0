//! HTTP wrapper shared by every data-access call.
//!
//! Each request reads the session token once and sends it as a bearer
//! header. A 401 from any endpoint clears the session and sends the
//! navigator to the login page before the error reaches the caller.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{ApiError, AuthApi, EventsApi, FriendsApi, InvitationsApi, NotificationsApi};
use crate::auth::SessionStore;
use crate::config::Config;
use crate::nav::Navigator;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the Hourglass backend.
/// Clone is cheap - reqwest::Client, the session and the navigator are all
/// shared handles.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: SessionStore,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    /// Client pointed at the address resolved from the environment and config.
    pub fn from_config(
        config: &Config,
        session: SessionStore,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        Self::new(config.api_base_url(), session, navigator)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    // ===== Resource clients =====

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn events(&self) -> EventsApi<'_> {
        EventsApi::new(self)
    }

    pub fn friends(&self) -> FriendsApi<'_> {
        FriendsApi::new(self)
    }

    pub fn invitations(&self) -> InvitationsApi<'_> {
        InvitationsApi::new(self)
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(self)
    }

    // ===== Request plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the token, send, and apply the global response policy.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        // Single storage lookup per request
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        warn!(status = status.as_u16(), error = %err, "Request failed");
        Err(err)
    }

    /// Purge the session and return to login. Safe to run concurrently.
    fn handle_unauthorized(&self) {
        warn!("Server rejected the session token");
        self.session.clear();
        self.navigator.force_login();
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url = %url, error = %e, "Unexpected response shape");
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.send(self.client.get(self.url(path))).await?;
        Self::parse(response).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!(path, "GET");
        let response = self
            .send(self.client.get(self.url(path)).query(query))
            .await?;
        Self::parse(response).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(path, "POST");
        let response = self
            .send(self.client.post(self.url(path)).json(body))
            .await?;
        Self::parse(response).await
    }

    /// POST with no body, for action endpoints like accept/reject.
    pub(crate) async fn post_action<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!(path, "POST");
        let response = self
            .send(self.client.post(self.url(path)).query(query))
            .await?;
        Self::parse(response).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(path, "PUT");
        let response = self
            .send(self.client.put(self.url(path)).json(body))
            .await?;
        Self::parse(response).await
    }

    /// DELETE, discarding whatever body the server returns.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        self.send(self.client.delete(self.url(path))).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
