//! Session manager: the live auth state machine.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views call `initialize` once at startup, then `login`, `register` and
//! `logout`. Every state change is published on a `watch` channel so the
//! route guard and views always read the latest `SessionState`.
//!
//! DESIGN
//! ======
//! - Operations are serialized in call order by an async mutex; an operation
//!   never observes another one half-way through.
//! - `is_loading` is reset and in-flight phases are unwound by a drop guard,
//!   so the state settles on success, on error, on panic, and when the
//!   operation future is dropped before completing.
//! - Logout teardown also runs from a drop guard: the local session is always
//!   cleared, whatever the backend says.
//! - Initialization is fail-closed: any validation failure clears storage
//!   and lands in `Unauthenticated` without surfacing an error.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};

use super::token_store::{FileTokenStore, StorageError, StoredSession, TokenStore};
use crate::config::ClientConfig;
use crate::net::api::{ApiError, ApiErrorKind, AuthApi, HttpAuthApi};
use crate::net::types::User;

/// Where the shell must navigate once a session has been torn down.
pub const POST_LOGOUT_PATH: &str = "/post-logout";

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Snapshot published to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub is_loading: bool,
    token_present: bool,
}

impl SessionState {
    #[must_use]
    pub fn new(phase: SessionPhase, user: Option<User>, is_loading: bool, token_present: bool) -> Self {
        Self { phase, user, is_loading, token_present }
    }

    /// Startup state: nothing known yet, loading.
    #[must_use]
    pub fn initializing() -> Self {
        Self::new(SessionPhase::Initializing, None, true, false)
    }

    /// Settled, signed-out state.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::new(SessionPhase::Unauthenticated, None, false, false)
    }

    /// True only when a user is loaded and a token is stored. A cached user
    /// without a token never counts.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token_present
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initializing()
    }
}

/// Signal returned by `logout`: the shell must perform a full navigation to
/// `redirect_to`, discarding any state it holds beyond the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTerminated {
    pub redirect_to: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Backend failure class, if the error came from the backend.
    #[must_use]
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api(e) => Some(e.kind()),
            Self::Storage(_) => None,
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

struct Inner {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    ops: Mutex<()>,
    initialized: AtomicBool,
}

impl Inner {
    fn publish(&self, phase: SessionPhase, user: Option<User>, is_loading: bool) {
        let token_present = self.store.has_token();
        self.state
            .send_replace(SessionState::new(phase, user, is_loading, token_present));
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear session storage");
        }
    }
}

/// Owns the session state and the only write path into the token store.
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::initializing());
        Self {
            inner: Arc::new(Inner { api, store, state, ops: Mutex::new(()), initialized: AtomicBool::new(false) }),
        }
    }

    /// Wire the HTTP client and file-backed store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api = HttpAuthApi::new(&config.api_url, config.timeouts)?;
        let store = FileTokenStore::new(config.storage_path.clone());
        Ok(Self::new(Arc::new(api), Arc::new(store)))
    }

    /// Current state, with token presence re-read from storage.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let mut state = self.inner.state.borrow().clone();
        state.token_present = self.inner.store.has_token();
        state
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Receive every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Validate any stored session against the backend. Runs once; later
    /// calls return the current state without touching the backend.
    pub async fn initialize(&self) -> SessionState {
        let _op = self.inner.ops.lock().await;
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already initialized");
            return self.state();
        }
        let _settle = SettleGuard::new(&self.inner, SessionPhase::Initializing, SessionState::signed_out());

        let stored = match self.inner.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; starting signed out");
                self.inner.clear_store();
                StoredSession::default()
            }
        };

        match stored {
            StoredSession { token: Some(token), user: Some(cached) } => {
                match self.inner.api.current_user(&token).await {
                    Ok(user) => {
                        if user != cached {
                            tracing::debug!(user_id = %user.id, "cached user was stale");
                        }
                        if let Err(e) = self.inner.store.save(&token, &user) {
                            tracing::warn!(error = %e, "failed to refresh cached user");
                        }
                        tracing::info!(user_id = %user.id, "stored session restored");
                        self.inner.publish(SessionPhase::Authenticated, Some(user), false);
                    }
                    Err(e) => {
                        tracing::info!(error = %e, "stored session rejected; clearing");
                        self.inner.clear_store();
                        self.inner.publish(SessionPhase::Unauthenticated, None, false);
                    }
                }
            }
            StoredSession { token: None, user: None } => {
                self.inner.publish(SessionPhase::Unauthenticated, None, false);
            }
            _ => {
                tracing::debug!("partial stored session; clearing");
                self.inner.clear_store();
                self.inner.publish(SessionPhase::Unauthenticated, None, false);
            }
        }
        self.state()
    }

    /// Log in and establish a session. On any failure storage is cleared, the
    /// state is signed out, and the error is returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns the backend or storage failure that aborted the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _op = self.inner.ops.lock().await;
        self.login_locked(email, password).await
    }

    /// Create an account, then log in with the same credentials. A failed
    /// registration leaves the previous session state untouched.
    ///
    /// # Errors
    ///
    /// Returns the registration failure, or the failure of the follow-up login.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _op = self.inner.ops.lock().await;
        let _settle = self.begin(SessionPhase::Authenticating);

        let created = self.inner.api.register(email, password).await.map_err(|e| {
            tracing::warn!(%email, error = %e, "registration failed");
            SessionError::from(e)
        })?;
        tracing::info!(user_id = %created.id, "account registered");

        self.login_locked(email, password).await
    }

    /// Tear down the session. The backend call is best-effort; local state
    /// and storage are always cleared.
    pub async fn logout(&self) -> SessionTerminated {
        let _op = self.inner.ops.lock().await;
        let token = self.inner.store.load().ok().and_then(|stored| stored.token);
        let teardown = TeardownGuard { inner: &self.inner };

        if let Err(e) = self.inner.api.logout(token.as_deref()).await {
            tracing::warn!(error = %e, "logout request failed; clearing local session anyway");
        }

        drop(teardown);
        tracing::info!("session terminated");
        SessionTerminated { redirect_to: POST_LOGOUT_PATH }
    }

    async fn login_locked(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let _settle = self.begin(SessionPhase::Authenticating);
        match self.establish(email, password).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "login succeeded");
                self.inner
                    .publish(SessionPhase::Authenticated, Some(user.clone()), false);
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(%email, error = %e, "login failed");
                self.inner.clear_store();
                self.inner.publish(SessionPhase::Unauthenticated, None, false);
                Err(e)
            }
        }
    }

    async fn establish(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let token = self.inner.api.login(email, password).await?;
        let user = self.inner.api.current_user(&token.access_token).await?;
        self.inner.store.save(&token.access_token, &user)?;
        Ok(user)
    }

    fn begin(&self, phase: SessionPhase) -> SettleGuard<'_> {
        let previous = self.inner.state.borrow().clone();
        self.inner.state.send_modify(|s| {
            s.phase = phase;
            s.is_loading = true;
        });
        SettleGuard::new(&self.inner, phase, previous)
    }
}

// =============================================================================
// GUARDS
// =============================================================================

/// Clears `is_loading` on drop. If the state is still in the guarded phase
/// the operation never settled, so the pre-operation state is restored.
struct SettleGuard<'a> {
    inner: &'a Inner,
    in_flight: SessionPhase,
    restore: SessionState,
}

impl<'a> SettleGuard<'a> {
    fn new(inner: &'a Inner, in_flight: SessionPhase, restore: SessionState) -> Self {
        Self { inner, in_flight, restore }
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        let token_present = self.inner.store.has_token();
        let in_flight = self.in_flight;
        let restore = &self.restore;
        self.inner.state.send_modify(|s| {
            if s.phase == in_flight {
                s.phase = restore.phase;
                s.user.clone_from(&restore.user);
            }
            s.is_loading = false;
            s.token_present = token_present;
        });
    }
}

/// Clears storage and signs out on drop.
struct TeardownGuard<'a> {
    inner: &'a Inner,
}

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        self.inner.clear_store();
        self.inner.publish(SessionPhase::Unauthenticated, None, false);
    }
}
