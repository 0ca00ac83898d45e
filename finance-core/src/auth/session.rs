use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::models::{AuthResponse, User};
use crate::storage::KeyValueStore;
use crate::store::{Observers, SubscriptionId};

use super::gate::AuthGate;

pub const TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user_data";

/// Tokens shorter than this are leftovers from a broken login.
const MIN_TOKEN_LEN: usize = 10;

#[derive(Debug, Default, Clone)]
struct SessionState {
    token: Option<String>,
    refresh_token: Option<String>,
    user_json: Option<String>,
}

/// Bearer-token session kept in a [`KeyValueStore`].
///
/// Values are mirrored in memory so `is_authenticated` never waits on
/// storage; every change is written through.
pub struct TokenSession {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<SessionState>,
    observers: Observers<bool>,
}

impl TokenSession {
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = SessionState {
            token: read(&*storage, TOKEN_KEY).await,
            refresh_token: read(&*storage, REFRESH_TOKEN_KEY).await,
            user_json: read(&*storage, USER_KEY).await,
        };

        Self {
            storage,
            state: Mutex::new(state),
            observers: Observers::new(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    /// Stored user, if present and readable.
    pub fn user(&self) -> Option<User> {
        let raw = self.lock().user_json.clone()?;
        serde_json::from_str(&raw)
            .inspect_err(|e| debug!(error = %e, "stored user data is unreadable"))
            .ok()
    }

    /// Save a successful login or OTP verification.
    pub async fn store_auth_data(
        &self,
        response: &AuthResponse,
    ) {
        let user_json = serde_json::to_string(&response.user).ok();
        {
            let mut state = self.lock();
            state.token = Some(response.token.clone());
            state.refresh_token = Some(response.refresh_token.clone());
            state.user_json = user_json.clone();
        }

        self.write(TOKEN_KEY, Some(&response.token)).await;
        self.write(REFRESH_TOKEN_KEY, Some(&response.refresh_token)).await;
        self.write(USER_KEY, user_json.as_deref()).await;

        info!(user_id = response.user.id, "session stored");
        self.observers.notify(&true);
    }

    /// Replace the stored profile, e.g. after an edit.
    pub async fn store_user(
        &self,
        user: &User,
    ) {
        let user_json = serde_json::to_string(user).ok();
        self.lock().user_json = user_json.clone();
        self.write(USER_KEY, user_json.as_deref()).await;
    }

    /// Install a token obtained through a refresh.
    pub async fn update_token(
        &self,
        token: &str,
    ) {
        self.lock().token = Some(token.to_string());
        self.write(TOKEN_KEY, Some(token)).await;
    }

    pub async fn logout(&self) {
        *self.lock() = SessionState::default();
        self.write(TOKEN_KEY, None).await;
        self.write(REFRESH_TOKEN_KEY, None).await;
        self.write(USER_KEY, None).await;

        info!("session cleared");
        self.observers.notify(&false);
    }

    /// Drop values a broken login could leave behind: a token spelled
    /// `null`/`undefined` or too short to be real, and a user record
    /// spelled `null`/`undefined` (which also invalidates the refresh
    /// token).
    pub async fn clear_stale_auth_data(&self) {
        let (stale_token, stale_user) = {
            let mut state = self.lock();
            let stale_token = state.token.as_deref().is_some_and(is_stale_token);
            let stale_user = state.user_json.as_deref().is_some_and(is_placeholder);
            if stale_token {
                state.token = None;
            }
            if stale_user {
                state.user_json = None;
                state.refresh_token = None;
            }
            (stale_token, stale_user)
        };

        if stale_token {
            warn!("discarding malformed auth token");
            self.write(TOKEN_KEY, None).await;
        }
        if stale_user {
            warn!("discarding malformed user data");
            self.write(USER_KEY, None).await;
            self.write(REFRESH_TOKEN_KEY, None).await;
        }
    }

    /// Called with `true` on login and `false` on logout.
    pub fn subscribe(
        &self,
        callback: impl Fn(&bool) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) -> bool {
        self.observers.unsubscribe(id)
    }

    async fn write(
        &self,
        key: &str,
        value: Option<&str>,
    ) {
        let result = match value {
            Some(value) => self.storage.set(key, value).await,
            None => self.storage.remove(key).await,
        };
        if let Err(e) = result {
            warn!(key, error = %e, "could not persist session data");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuthGate for TokenSession {
    fn is_authenticated(&self) -> bool {
        self.lock().token.as_deref().is_some_and(|t| !t.is_empty())
    }

    async fn force_auth_check(&self) -> bool {
        self.clear_stale_auth_data().await;
        self.is_authenticated()
    }
}

async fn read(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Option<String> {
    storage.get(key).await.unwrap_or_else(|e| {
        warn!(key, error = %e, "could not read session data");
        None
    })
}

fn is_placeholder(value: &str) -> bool {
    value == "null" || value == "undefined"
}

fn is_stale_token(token: &str) -> bool {
    is_placeholder(token) || token.chars().count() < MIN_TOKEN_LEN
}
