use async_trait::async_trait;
use reqwest::StatusCode;

use crate::errors::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, SessionUser, SignupRequest};

/// Remote auth endpoints the session layer depends on. Trait seam so tests
/// and offline tooling can substitute the transport.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse>;
    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse>;
    async fn fetch_current_user(&self, token: &str) -> AppResult<SessionUser>;
}

/// reqwest-backed client for the portal backend.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> AppResult<Self> {
        let base_url =
            std::env::var("PORTAL_API_URL").map_err(|_| AppError::configuration("PORTAL_API_URL not set"))?;
        Ok(Self::new(base_url))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => AppError::unauthorized(body),
            StatusCode::FORBIDDEN => AppError::forbidden(body),
            status if status.is_client_error() => AppError::bad_request(body),
            status => AppError::internal(format!("{status}: {body}")),
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        let response = self.client.post(self.url("/auth/login")).json(request).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn signup(&self, request: &SignupRequest) -> AppResult<AuthResponse> {
        let response = self.client.post(self.url("/auth/signup")).json(request).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch_current_user(&self, token: &str) -> AppResult<SessionUser> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
