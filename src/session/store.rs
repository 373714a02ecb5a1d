//! Session Store
//!
//! The single owner of authentication state. Cloning a [`SessionStore`]
//! hands out another handle to the same session; all mutation goes through
//! [`SessionStore::login`] and [`SessionStore::logout`].

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::error::{SessionError, SessionResult};
use super::storage::TokenStorage;
use crate::api::{Profile, StudyApi};

/// Capacity of the session event channel
const EVENT_CAPACITY: usize = 64;

/// The client's belief about who is signed in
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    /// Bearer token, empty when signed out
    pub token: String,
    /// Only trusted while `token` is non-empty
    pub user: Option<Profile>,
    /// Bumped on every token change
    pub epoch: u64,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Session for `token` with no user loaded yet
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }
}

/// Notifications published after each session mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new non-empty token was installed
    TokenChanged { epoch: u64 },
    /// The identity check for `epoch` succeeded
    UserLoaded { epoch: u64 },
    /// Token and user were cleared
    SignedOut { epoch: u64 },
}

/// Result of an identity check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// No token, nothing to check
    Anonymous,
    /// Server accepted the token; user is loaded
    Verified,
    /// Server rejected the token (or the check failed); session cleared
    Rejected,
    /// The token changed while the check was in flight; result dropped
    Stale,
}

struct Inner {
    state: RwLock<Session>,
    storage: Box<dyn TokenStorage>,
    events: broadcast::Sender<SessionEvent>,
}

/// Shared handle to the session
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Start signed out, ignoring anything already in `storage`
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self::from_parts(Session::default(), Box::new(storage))
    }

    /// Start from whatever token `storage` holds
    pub fn restore(storage: impl TokenStorage + 'static) -> SessionResult<Self> {
        let session = match storage.load()? {
            Some(token) => {
                tracing::info!("Restored session from storage");
                Session {
                    token,
                    user: None,
                    epoch: 1,
                }
            }
            None => Session::default(),
        };

        Ok(Self::from_parts(session, Box::new(storage)))
    }

    fn from_parts(session: Session, storage: Box<dyn TokenStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(session),
                storage,
                events,
            }),
        }
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.inner.state.read().await.clone()
    }

    /// Current token, empty when signed out
    pub async fn token(&self) -> String {
        self.inner.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<Profile> {
        self.inner.state.read().await.user.clone()
    }

    pub async fn epoch(&self) -> u64 {
        self.inner.state.read().await.epoch
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.state.read().await.is_authenticated()
    }

    /// Whether a result fetched under `epoch` still belongs to the live session
    pub async fn is_current(&self, epoch: u64) -> bool {
        self.inner.state.read().await.epoch == epoch
    }

    /// Receive [`SessionEvent`]s published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Install a new token.
    ///
    /// The token is persisted before it becomes visible; if persisting fails
    /// the session is left untouched. Any previously loaded user is dropped.
    /// Tokens are stored exactly as given, so blank or whitespace-padded ones
    /// are rejected. Returns the new epoch.
    pub async fn login(&self, token: &str) -> SessionResult<u64> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        if token.trim() != token {
            return Err(SessionError::PaddedToken);
        }

        let epoch = {
            let mut state = self.inner.state.write().await;
            self.inner.storage.save(token)?;

            state.token = token.to_string();
            state.user = None;
            state.epoch += 1;
            state.epoch
        };

        tracing::info!(epoch, "Signed in");
        self.publish(SessionEvent::TokenChanged { epoch });
        Ok(epoch)
    }

    /// Clear token, user and the stored token. Safe to call when signed out.
    pub async fn logout(&self) {
        self.clear(None).await;
    }

    /// Log out only if the session is still at `epoch`.
    ///
    /// Used when a failure observed for one token must not end a newer session.
    pub async fn logout_if_current(&self, epoch: u64) -> bool {
        self.clear(Some(epoch)).await
    }

    async fn clear(&self, expected_epoch: Option<u64>) -> bool {
        let epoch = {
            let mut state = self.inner.state.write().await;

            if let Some(expected) = expected_epoch {
                if state.epoch != expected {
                    tracing::debug!(expected, current = state.epoch, "Skipping logout for stale epoch");
                    return false;
                }
            }

            if let Err(e) = self.inner.storage.clear() {
                tracing::warn!("Failed to clear stored token: {}", e);
            }

            if !state.is_authenticated() && state.user.is_none() {
                return false;
            }

            state.token.clear();
            state.user = None;
            state.epoch += 1;
            state.epoch
        };

        tracing::info!(epoch, "Signed out");
        self.publish(SessionEvent::SignedOut { epoch });
        true
    }

    /// Validate the current token against the backend.
    ///
    /// On success the user is stored; on any failure the session is cleared.
    /// Either way, nothing is applied if the token changed in the meantime.
    pub async fn refresh_identity(&self, api: &dyn StudyApi) -> IdentityOutcome {
        let epoch = {
            let state = self.inner.state.read().await;
            if !state.is_authenticated() {
                return IdentityOutcome::Anonymous;
            }
            state.epoch
        };

        match api.current_user().await {
            Ok(profile) => {
                {
                    let mut state = self.inner.state.write().await;
                    if state.epoch != epoch {
                        tracing::debug!(epoch, "Discarding identity for replaced token");
                        return IdentityOutcome::Stale;
                    }
                    state.user = Some(profile);
                }

                tracing::debug!(epoch, "Identity verified");
                self.publish(SessionEvent::UserLoaded { epoch });
                IdentityOutcome::Verified
            }
            Err(e) => {
                if self.logout_if_current(epoch).await {
                    tracing::warn!(epoch, "Identity check failed, signed out: {}", e);
                    IdentityOutcome::Rejected
                } else if self.is_current(epoch).await {
                    // Already signed out under this epoch
                    IdentityOutcome::Rejected
                } else {
                    tracing::debug!(epoch, "Ignoring identity failure for replaced token");
                    IdentityOutcome::Stale
                }
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
