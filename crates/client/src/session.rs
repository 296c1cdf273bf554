//! Explicit session state shared by the HTTP client and its callers.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shopno_auth::AuthUser;

use crate::ClientConfig;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    csrf_token: Option<String>,
    user: Option<AuthUser>,
}

/// Bearer token, CSRF token and the loaded user.
///
/// Cloning is cheap; clones share state, so a 401 seen by one client
/// invalidates the token for every holder.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session from configured tokens.
    pub fn from_config(config: &ClientConfig) -> Self {
        let session = Self::new();
        {
            let mut state = session.write();
            state.token = config.auth_token().map(str::to_string);
            state.csrf_token = config.csrf_token().map(str::to_string);
        }
        session
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.write().token = Some(token.into());
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.read().csrf_token.clone()
    }

    pub fn set_csrf_token(&self, token: impl Into<String>) {
        self.write().csrf_token = Some(token.into());
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.read().user.clone()
    }

    pub fn set_user(&self, user: AuthUser) {
        self.write().user = Some(user);
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// Drop the bearer token and the loaded user. The CSRF token survives.
    pub fn invalidate(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }
}
