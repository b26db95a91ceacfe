//! Scripted auth backend and fixtures shared by unit tests.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{AuthToken, User};
use crate::state::session::SessionManager;
use crate::state::token_store::MemoryTokenStore;

// =========================================================================
// MockApi
// =========================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Login(String, String),
    Register(String, String),
    Logout(Option<String>),
    CurrentUser(String),
}

#[derive(Default)]
pub struct MockApi {
    pub calls: StdMutex<Vec<Call>>,
    /// Token issued on login; `None` rejects the credentials.
    pub token: Option<String>,
    /// User returned by `current_user`; `None` rejects the token.
    pub user: Option<User>,
    pub register_rejected: bool,
    pub logout_unreachable: bool,
    pub current_user_unreachable: bool,
    pub login_hangs: bool,
    pub logout_hangs: bool,
    pub register_panics: bool,
    pub login_delay: Option<Duration>,
}

impl MockApi {
    pub fn accepting(token: &str, user: User) -> Self {
        Self { token: Some(token.to_owned()), user: Some(user), ..Self::default() }
    }

    pub fn rejecting() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl AuthApi for MockApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        self.record(Call::Login(email.to_owned(), password.to_owned()));
        if self.login_hangs {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.login_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.token {
            Some(token) => Ok(AuthToken { access_token: token.clone(), token_type: "bearer".into() }),
            None => Err(ApiError::Unauthorized { detail: "LOGIN_BAD_CREDENTIALS".into() }),
        }
    }

    async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        self.record(Call::Register(email.to_owned(), password.to_owned()));
        assert!(!self.register_panics, "register backend crashed");
        if self.register_rejected {
            return Err(ApiError::Validation { status: 400, detail: "REGISTER_USER_ALREADY_EXISTS".into() });
        }
        Ok(User { email: email.to_owned(), ..test_user() })
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        self.record(Call::Logout(token.map(str::to_owned)));
        if self.logout_hangs {
            std::future::pending::<()>().await;
        }
        if self.logout_unreachable {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.record(Call::CurrentUser(token.to_owned()));
        if self.current_user_unreachable {
            return Err(ApiError::Transport("connection refused".into()));
        }
        let token_ok = self.token.as_deref().is_none_or(|t| t == token);
        match (&self.user, token_ok) {
            (Some(user), true) => Ok(user.clone()),
            _ => Err(ApiError::Unauthorized { detail: "Unauthorized".into() }),
        }
    }
}

pub fn test_user() -> User {
    User {
        id: "1".into(),
        email: "test@example.com".into(),
        is_active: true,
        is_superuser: false,
        is_verified: true,
    }
}

pub fn manager(api: MockApi) -> (SessionManager, Arc<MockApi>, Arc<MemoryTokenStore>) {
    let api = Arc::new(api);
    let store = Arc::new(MemoryTokenStore::new());
    let manager = SessionManager::new(api.clone(), store.clone());
    (manager, api, store)
}
