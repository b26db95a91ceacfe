//! Auth REST client.
//!
//! DESIGN
//! ======
//! `AuthApi` is the seam between the session manager and the backend. The
//! production implementation, `HttpAuthApi`, issues the four auth requests
//! with `reqwest`; tests substitute scripted mocks.
//!
//! ERROR HANDLING
//! ==============
//! Every failure becomes an `ApiError`. Status codes are classified here so
//! callers only deal with the transport / auth / validation taxonomy and
//! never inspect raw HTTP responses.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;

use super::types::{AuthToken, LoginRequest, RegisterRequest, User};
use crate::config::HttpTimeouts;

pub const LOGIN_PATH: &str = "/auth/jwt/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/jwt/logout";
pub const CURRENT_USER_PATH: &str = "/users/me";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend could not be reached or the exchange was cut short.
    #[error("network request failed: {0}")]
    Transport(String),

    /// Credentials or bearer token rejected.
    #[error("not authorized: {detail}")]
    Unauthorized { detail: String },

    /// Request rejected as invalid (duplicate email, weak password, ...).
    #[error("request rejected ({status}): {detail}")]
    Validation { status: u16, detail: String },

    /// The backend failed or answered with an unexpected status.
    #[error("server error: status {status}")]
    Server { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Coarse failure taxonomy exposed to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Transport,
    Auth,
    Validation,
    Unexpected,
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Transport(_) => ApiErrorKind::Transport,
            Self::Unauthorized { .. } => ApiErrorKind::Auth,
            Self::Validation { .. } => ApiErrorKind::Validation,
            Self::Server { .. } | Self::Parse(_) | Self::HttpClientBuild(_) => ApiErrorKind::Unexpected,
        }
    }
}

/// Which request produced a failing status. Login reports bad credentials as
/// 400, every other endpoint uses 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Login,
    Register,
    Logout,
    CurrentUser,
}

fn classify_status(endpoint: Endpoint, status: u16, body: &str) -> ApiError {
    match status {
        401 => ApiError::Unauthorized { detail: extract_detail(body) },
        400 if endpoint == Endpoint::Login => ApiError::Unauthorized { detail: extract_detail(body) },
        400..=499 => ApiError::Validation { status, detail: extract_detail(body) },
        _ => ApiError::Server { status, body: body.to_owned() },
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// Accepts `{"detail": "CODE"}`, `{"detail": {"code": .., "reason": ..}}` and
/// validation lists `{"detail": [{"msg": ..}, ..]}`; anything else is returned
/// trimmed as-is.
fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_owned();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Object(obj)) => obj
            .get("reason")
            .or_else(|| obj.get("code"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| serde_json::Value::Object(obj.clone()).to_string(), str::to_owned),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_owned(),
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// =============================================================================
// TRAIT
// =============================================================================

/// The four auth requests the session manager depends on.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError>;

    /// Create an account. Does not establish a session.
    async fn register(&self, email: &str, password: &str) -> Result<User, ApiError>;

    /// Invalidate the session server-side. Best-effort.
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;

    /// Fetch the user the bearer token belongs to.
    async fn current_user(&self, token: &str) -> Result<User, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Build a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a prepared request, returning the body of a 2xx response.
    async fn execute(&self, endpoint: Endpoint, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let resp = request.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        if !status.is_success() {
            tracing::debug!(?endpoint, status = status.as_u16(), "auth request rejected");
            return Err(classify_status(endpoint, status.as_u16(), &body));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(String::new());
        }
        Ok(body)
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(format!("{e}: {body}")))
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        let form = LoginRequest { username: email, password };
        let request = self.http.post(self.url(LOGIN_PATH)).form(&form);
        let body = self.execute(Endpoint::Login, request).await?;
        parse_body(&body)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let payload = RegisterRequest { email, password };
        let request = self.http.post(self.url(REGISTER_PATH)).json(&payload);
        let body = self.execute(Endpoint::Register, request).await?;
        parse_body(&body)
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let mut request = self.http.post(self.url(LOGOUT_PATH));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, bearer(token));
        }
        self.execute(Endpoint::Logout, request).await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let request = self
            .http
            .get(self.url(CURRENT_USER_PATH))
            .header(AUTHORIZATION, bearer(token));
        let body = self.execute(Endpoint::CurrentUser, request).await?;
        parse_body(&body)
    }
}
