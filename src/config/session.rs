//! Authenticated session context
//!
//! The signed-in user and bearer token live in a [`SessionHandle`] that is
//! passed explicitly to whatever needs it (the API client, the front end).
//! Persistent handles keep the profile in `session.json` and the token in
//! the system keyring so a later run can resume without logging in again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::Config;
use crate::api::auth::TokenVault;

/// Role of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    #[serde(alias = "instructor")]
    Teacher,
    Admin,
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A bearer token together with the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Authentication state changes, observable through [`SessionHandle::subscribe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// No session yet
    Anonymous,
    SignedIn { user_id: String },
    SignedOut,
    /// The server rejected the token; the front end should go to `route`
    RedirectToLogin { route: String },
}

/// What gets written to `session.json` (the token stays in the keyring)
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user: User,
}

struct Inner {
    session: watch::Sender<Option<AuthSession>>,
    events: watch::Sender<AuthEvent>,
    profile_path: Option<PathBuf>,
}

/// Cloneable handle to the current session
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("signed_in", &self.is_signed_in())
            .field("persistent", &self.inner.profile_path.is_some())
            .finish()
    }
}

impl SessionHandle {
    /// A handle that never touches disk or the keyring
    pub fn in_memory() -> Self {
        Self::build(None, None)
    }

    /// A handle backed by `session.json` in the data directory and the keyring
    pub fn persistent() -> Result<Self> {
        let path = Config::data_dir()?.join("session.json");
        let restored = Self::restore(&path)?;
        Ok(Self::build(Some(path), restored))
    }

    fn build(profile_path: Option<PathBuf>, initial: Option<AuthSession>) -> Self {
        let event = match &initial {
            Some(s) => AuthEvent::SignedIn { user_id: s.user.id.clone() },
            None => AuthEvent::Anonymous,
        };
        let (session, _) = watch::channel(initial);
        let (events, _) = watch::channel(event);
        Self { inner: Arc::new(Inner { session, events, profile_path }) }
    }

    fn restore(path: &Path) -> Result<Option<AuthSession>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {:?}", path))?;
        let stored: StoredSession =
            serde_json::from_str(&contents).with_context(|| "Failed to parse session.json")?;

        match TokenVault::get_token() {
            Ok(token) => Ok(Some(AuthSession { token, user: stored.user })),
            Err(e) => {
                tracing::debug!("No stored token, ignoring saved profile: {}", e);
                Ok(None)
            }
        }
    }

    /// Current session, if signed in
    pub fn current(&self) -> Option<AuthSession> {
        self.inner.session.borrow().clone()
    }

    /// Current bearer token, if signed in
    pub fn token(&self) -> Option<String> {
        self.inner.session.borrow().as_ref().map(|s| s.token.clone())
    }

    /// Current user, if signed in
    pub fn user(&self) -> Option<User> {
        self.inner.session.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.session.borrow().is_some()
    }

    /// Install a new session (after login)
    pub fn set(&self, session: AuthSession) -> Result<()> {
        if let Some(path) = &self.inner.profile_path {
            TokenVault::set_token(&session.token)?;
            write_profile(path, &session.user)?;
        }

        let user_id = session.user.id.clone();
        self.inner.session.send_replace(Some(session));
        self.inner.events.send_replace(AuthEvent::SignedIn { user_id });
        Ok(())
    }

    /// Explicit logout
    pub fn sign_out(&self) {
        self.clear();
        self.inner.events.send_replace(AuthEvent::SignedOut);
    }

    /// Drop the session after the server rejected it.
    ///
    /// `SignedOut` is published right away and the redirect event after
    /// `delay`, from a background task when a runtime is available.
    pub fn expire(&self, route: impl Into<String>, delay: std::time::Duration) {
        self.clear();
        self.inner.events.send_replace(AuthEvent::SignedOut);

        let route = route.into();
        let events = self.inner.events.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    events.send_replace(AuthEvent::RedirectToLogin { route });
                });
            }
            Err(_) => {
                events.send_replace(AuthEvent::RedirectToLogin { route });
            }
        }
    }

    /// Observe authentication events
    pub fn subscribe(&self) -> watch::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    fn clear(&self) {
        self.inner.session.send_replace(None);

        if let Some(path) = &self.inner.profile_path {
            if let Err(e) = TokenVault::delete_token() {
                tracing::warn!("Failed to delete stored token: {}", e);
            }
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!("Failed to remove {:?}: {}", path, e);
                }
            }
        }
    }
}

fn write_profile(path: &Path, user: &User) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {:?}", parent))?;
    }

    let contents = serde_json::to_string_pretty(&StoredSession { user: user.clone() })
        .with_context(|| "Failed to serialize session")?;

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write session to {:?}", path))?;

    Ok(())
}
