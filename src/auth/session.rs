// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth session state holder.
//!
//! ```text
//! Anonymous ──begin_login──▶ Authenticating ──complete_login──▶ Authenticated
//!     ▲                            │                                  │
//!     └────────fail_login──────────┘◀──────logout / expire────────────┘
//! ```
//!
//! The persisted token and profile are the source of truth across restarts.
//! State changes are published on a `watch` channel so the dashboard
//! aggregator can start and stop with the session.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::models::LoginResponse;
use crate::storage::{
    KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY,
};

/// Profile persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub account_id: String,
    #[serde(default)]
    pub region: Option<String>,
    pub login_time: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub account_id: String,
    pub login_time: DateTime<Utc>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("login_time", &self.login_time)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(AuthSession),
}

/// Published session state plus the last error kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub state: AuthState,
    pub error: Option<ApiError>,
}

impl AuthSnapshot {
    fn anonymous(error: Option<ApiError>) -> Self {
        Self {
            state: AuthState::Anonymous,
            error,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }
}

/// Shared handle to the auth session. Cloning is cheap.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<AuthSnapshot>,
}

impl SessionManager {
    /// Rebuild the session from persisted storage without any network call.
    ///
    /// A token plus a parseable profile means authenticated. A profile that
    /// fails to parse clears every session key.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let token = read_key(store.as_ref(), ACCESS_TOKEN_KEY);
        let profile = read_key(store.as_ref(), USER_KEY);

        let snapshot = match (token, profile) {
            (Some(token), Some(raw_profile)) => {
                match serde_json::from_str::<UserProfile>(&raw_profile) {
                    Ok(profile) => {
                        info!(account_id = %profile.account_id, "Restored persisted session");
                        AuthSnapshot {
                            state: AuthState::Authenticated(AuthSession {
                                token,
                                account_id: profile.account_id,
                                login_time: profile.login_time,
                            }),
                            error: None,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Persisted profile is corrupt, clearing session");
                        clear_session_keys(store.as_ref());
                        AuthSnapshot::anonymous(None)
                    }
                }
            }
            _ => AuthSnapshot::anonymous(None),
        };

        let (state, _) = watch::channel(snapshot);
        Self {
            inner: Arc::new(Inner { store, state }),
        }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn current(&self) -> Option<AuthSession> {
        match &self.inner.state.borrow().state {
            AuthState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Token attached to outgoing requests, read from persisted storage.
    pub fn access_token(&self) -> Option<String> {
        read_key(self.inner.store.as_ref(), ACCESS_TOKEN_KEY)
    }

    /// Persisted refresh token. Nothing re-authenticates with it.
    pub fn refresh_token(&self) -> Option<String> {
        read_key(self.inner.store.as_ref(), REFRESH_TOKEN_KEY)
    }

    pub fn profile(&self) -> Option<UserProfile> {
        read_key(self.inner.store.as_ref(), USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn begin_login(&self) {
        self.inner.state.send_replace(AuthSnapshot {
            state: AuthState::Authenticating,
            error: None,
        });
    }

    /// Persist the accepted login and move to `Authenticated`.
    pub fn complete_login(
        &self,
        response: &LoginResponse,
        region: Option<String>,
    ) -> ApiResult<AuthSession> {
        let profile = UserProfile {
            account_id: response.account_id.clone(),
            region,
            login_time: Utc::now(),
        };

        if let Err(err) = self.persist(response, &profile) {
            clear_session_keys(self.inner.store.as_ref());
            self.fail_login(err.clone());
            return Err(err);
        }

        let session = AuthSession {
            token: response.access_token.clone(),
            account_id: profile.account_id,
            login_time: profile.login_time,
        };
        info!(account_id = %session.account_id, "Login succeeded");
        self.inner.state.send_replace(AuthSnapshot {
            state: AuthState::Authenticated(session.clone()),
            error: None,
        });
        Ok(session)
    }

    fn persist(&self, response: &LoginResponse, profile: &UserProfile) -> ApiResult<()> {
        let store = self.inner.store.as_ref();
        let profile_json = serde_json::to_string(profile)
            .map_err(|e| ApiError::new(ErrorCode::Storage, format!("serialize profile: {e}")))?;

        store
            .set(ACCESS_TOKEN_KEY, &response.access_token)
            .and_then(|_| store.set(USER_KEY, &profile_json))
            .and_then(|_| match &response.refresh_token {
                Some(refresh) => store.set(REFRESH_TOKEN_KEY, refresh),
                None => store.remove(REFRESH_TOKEN_KEY),
            })
            .map_err(|e| ApiError::new(ErrorCode::Storage, format!("persist session: {e}")))
    }

    pub fn fail_login(&self, error: ApiError) {
        warn!(code = %error.code, error = %error.message, "Login failed");
        self.inner
            .state
            .send_replace(AuthSnapshot::anonymous(Some(error)));
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|snapshot| {
            if snapshot.error.is_some() {
                snapshot.error = None;
                true
            } else {
                false
            }
        });
    }

    /// Explicit logout: clear persisted keys and return to `Anonymous`.
    pub fn logout(&self) {
        clear_session_keys(self.inner.store.as_ref());
        info!("Logged out");
        self.inner.state.send_replace(AuthSnapshot::anonymous(None));
    }

    /// Backend rejected the session (401). Only acts while authenticated;
    /// returns whether the session was torn down.
    pub fn expire(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        clear_session_keys(self.inner.store.as_ref());
        warn!("Session expired, persisted credentials cleared");
        self.inner
            .state
            .send_replace(AuthSnapshot::anonymous(Some(ApiError::session_expired())));
        true
    }
}

fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted value");
            None
        }
    }
}

fn clear_session_keys(store: &dyn KeyValueStore) {
    for key in SESSION_KEYS {
        if let Err(e) = store.remove(key) {
            warn!(key, error = %e, "Failed to clear persisted value");
        }
    }
}
