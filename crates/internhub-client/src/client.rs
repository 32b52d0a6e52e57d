//! HTTP transport for the portal API.
//!
//! # Purpose
//! A thin async wrapper over `reqwest` that attaches bearer tokens, applies
//! the configured timeouts, and turns non-2xx responses into
//! [`ClientError`]. Nothing here retries.
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    CodeIssued, Items, LoginRequest, NavEntry, PasswordResetConfirm, RegisterRequest,
    SessionGrant, VerifyCode,
};
use async_trait::async_trait;
use internhub_policy::Identity;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Authentication calls the session service depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ClientResult<SessionGrant>;
    async fn register(&self, request: &RegisterRequest) -> ClientResult<CodeIssued>;
    async fn verify_registration(&self, request: &VerifyCode) -> ClientResult<SessionGrant>;
    async fn logout(&self, token: &str) -> ClientResult<()>;
    async fn me(&self, token: &str) -> ClientResult<Identity>;
}

#[derive(Clone)]
pub struct PortalClient {
    base_url: String,
    client: reqwest::Client,
}

impl PortalClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|err| ClientError::Config(format!("build http client: {err}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_token(
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_response(status, &body);
        tracing::debug!(status = status.as_u16(), error = %err, "portal request failed");
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// GET `path` (for example `/v1/meetings`) and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ClientResult<T> {
        let request = Self::with_token(self.client.get(self.url(path)), token);
        Self::decode(self.execute(request).await?).await
    }

    /// GET with query parameters.
    pub async fn get_with_query<T, Q>(
        &self,
        path: &str,
        token: Option<&str>,
        query: &Q,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = Self::with_token(self.client.get(self.url(path)).query(query), token);
        Self::decode(self.execute(request).await?).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<B, T>(&self, path: &str, token: Option<&str>, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = Self::with_token(self.client.post(self.url(path)).json(body), token);
        Self::decode(self.execute(request).await?).await
    }

    /// POST for endpoints that answer `204 No Content`.
    pub async fn post_no_content<B>(
        &self,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(Self::with_token(request, token)).await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> ClientResult<CodeIssued> {
        self.post(
            "/v1/password-reset",
            None,
            &serde_json::json!({ "email": email }),
        )
        .await
    }

    pub async fn confirm_password_reset(&self, request: &PasswordResetConfirm) -> ClientResult<()> {
        self.post_no_content("/v1/password-reset/verify", None, Some(request))
            .await
    }

    pub async fn navigation(&self, token: &str) -> ClientResult<Vec<NavEntry>> {
        let list: Items<NavEntry> = self.get("/v1/navigation", Some(token)).await?;
        Ok(list.items)
    }

    pub async fn contacts(&self, token: &str) -> ClientResult<Vec<Identity>> {
        let list: Items<Identity> = self.get("/v1/contacts", Some(token)).await?;
        Ok(list.items)
    }

    pub async fn users(&self, token: &str) -> ClientResult<Vec<Identity>> {
        let list: Items<Identity> = self.get("/v1/users", Some(token)).await?;
        Ok(list.items)
    }

    /// Send a direct message; `T` is the caller's view of the stored message.
    pub async fn send_message<T: DeserializeOwned>(
        &self,
        token: &str,
        receiver_id: &str,
        content: &str,
    ) -> ClientResult<T> {
        self.post(
            "/v1/messages",
            Some(token),
            &serde_json::json!({ "receiver_id": receiver_id, "content": content }),
        )
        .await
    }

    /// Mark every message from `contact_id` as read and return how many changed.
    pub async fn mark_messages_read(&self, token: &str, contact_id: &str) -> ClientResult<usize> {
        #[derive(serde::Deserialize)]
        struct Updated {
            updated: usize,
        }
        let updated: Updated = self
            .post(
                "/v1/messages/read",
                Some(token),
                &serde_json::json!({ "contact_id": contact_id }),
            )
            .await?;
        Ok(updated.updated)
    }
}

#[async_trait]
impl AuthApi for PortalClient {
    async fn login(&self, request: &LoginRequest) -> ClientResult<SessionGrant> {
        self.post("/v1/login", None, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<CodeIssued> {
        self.post("/v1/register", None, request).await
    }

    async fn verify_registration(&self, request: &VerifyCode) -> ClientResult<SessionGrant> {
        self.post("/v1/register/verify", None, request).await
    }

    async fn logout(&self, token: &str) -> ClientResult<()> {
        self.post_no_content::<()>("/v1/logout", Some(token), None)
            .await
    }

    async fn me(&self, token: &str) -> ClientResult<Identity> {
        self.get("/v1/me", Some(token)).await
    }
}
