use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use client::{Api, LoginResponse};
use models::User;

use crate::{Session, SessionError, Stage, TokenStore};

pub struct InnerSessionManager {
    pub(crate) api: Arc<dyn Api>,
    pub(crate) store: TokenStore,

    pub(crate) revalidate_interval: Duration,
    pub(crate) revalidate_attempts: u32,
    pub(crate) retry_backoff: Duration,

    state: watch::Sender<Session>,

    /// Serializes lifecycle transitions. User-initiated operations queue on it;
    /// the periodic tick skips when it is held.
    transition: Mutex<()>,
}

/// Owner of the authenticated-user lifecycle. Cheap to clone; all clones share
/// one session.
///
/// Consumers read the session through [`subscribe`](SessionManager::subscribe)
/// or [`session`](SessionManager::session) and never mutate it directly.
#[derive(Clone)]
pub struct SessionManager(Arc<InnerSessionManager>);

impl Deref for SessionManager {
    type Target = InnerSessionManager;

    fn deref(&self) -> &InnerSessionManager {
        &self.0
    }
}

impl SessionManager {
    pub fn new(config: &config::Config, api: Arc<dyn Api>) -> SessionManager {
        SessionManager(Arc::new(InnerSessionManager {
            api,
            store: TokenStore::new(&config.paths.data_path),
            revalidate_interval: config.session.revalidate_interval,
            revalidate_attempts: config.session.revalidate_attempts.max(1),
            retry_backoff: config.session.retry_backoff,
            state: watch::channel(Session::default()).0,
            transition: Mutex::new(()),
        }))
    }

    /// Current snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Change notifications for UI consumers; the receiver always observes a
    /// coherent snapshot, never a half-applied transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn publish(&self, f: impl FnOnce(&mut Session)) {
        self.state.send_modify(f);
    }

    /// Startup transition: resume a persisted session if one exists. Without a
    /// stored token this stays `Unauthenticated` and makes no network call.
    pub async fn bootstrap(&self) {
        let _guard = self.transition.lock().await;

        let Some(token) = self.store.load().await else {
            log::debug!("No stored session token");
            self.publish(|s| *s = Session::default());
            return;
        };

        log::debug!("Resuming stored session");
        self.publish(|s| {
            s.token = Some(token);
            s.stage = Stage::Revalidating;
            s.is_loading = true;
            s.retries = 0;
        });

        self.revalidate_locked().await;
    }

    /// Periodic revalidation tick. Does nothing without a token; skipped
    /// entirely when another transition is already in flight.
    pub async fn tick(&self) {
        if self.state.borrow().token.is_none() {
            return;
        }

        let Ok(_guard) = self.transition.try_lock() else {
            log::trace!("Session transition in flight, skipping revalidation tick");
            return;
        };

        // re-check: the token may have been cleared while the lock was queued
        if self.state.borrow().token.is_none() {
            return;
        }

        self.publish(|s| {
            s.stage = Stage::Revalidating;
            s.is_loading = true;
            s.retries = 0;
        });

        self.revalidate_locked().await;
    }

    /// One revalidation event: up to `revalidate_attempts` identity fetches
    /// with a fixed backoff, reusing the token read at entry. Exhaustion is a
    /// silent logout, indistinguishable from never having been logged in.
    /// Caller holds the transition lock with `Revalidating` staged.
    async fn revalidate_locked(&self) {
        let token = match self.state.borrow().token.clone() {
            Some(token) => token,
            None => return,
        };

        let attempts = self.revalidate_attempts;

        for attempt in 1..=attempts {
            match self.api.current_user(&token).await {
                Ok(user) => {
                    log::debug!("Session revalidated for {}", user.display_name());
                    self.publish(|s| {
                        s.user = Some(user);
                        s.stage = Stage::Authenticated;
                        s.is_loading = false;
                        s.last_error = None;
                        s.retries = 0;
                    });
                    return;
                }
                Err(e) => {
                    log::debug!("Revalidation attempt {attempt}/{attempts} failed: {e}");
                    self.publish(|s| s.retries = attempt);

                    if attempt < attempts {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }

        log::info!("Session expired after {attempts} failed revalidation attempts");
        self.store.clear().await;
        self.publish(|s| *s = Session::default());
    }

    /// Exchanges credentials for a bearer token, persists it to both slots and
    /// publishes the authenticated state. The raw response is returned for any
    /// immediate use by the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, SessionError> {
        let _guard = self.transition.lock().await;

        self.publish(|s| {
            s.stage = Stage::Authenticating;
            s.is_loading = true;
            s.last_error = None;
        });

        match self.api.login(email, password).await {
            Ok(resp) => {
                self.store.save(&resp.token).await;

                let token = resp.token.clone();
                let user = resp.user.clone();
                self.publish(|s| {
                    s.token = Some(token);
                    s.user = user;
                    s.stage = Stage::Authenticated;
                    s.is_loading = false;
                    s.last_error = None;
                    s.retries = 0;
                });

                Ok(resp)
            }
            Err(e) => {
                log::debug!("Login rejected: {e}");

                let err = SessionError::LoginFailed(e);
                let msg = err.to_string();
                self.publish(|s| {
                    s.stage = Stage::Unauthenticated;
                    s.is_loading = false;
                    s.last_error = Some(msg);
                });

                Err(err)
            }
        }
    }

    /// Tears the session down. The backend call is best-effort: user and both
    /// token slots are always cleared, a broken backend must never leave the
    /// client believing it is still authenticated.
    pub async fn logout(&self) {
        let _guard = self.transition.lock().await;

        self.publish(|s| {
            s.stage = Stage::LoggingOut;
            s.is_loading = true;
        });

        // fall back to the persisted token so a logout issued before any
        // revalidation still reaches the backend
        let mut token = self.state.borrow().token.clone();
        if token.is_none() {
            token = self.store.load().await;
        }

        if let Some(token) = token {
            if let Err(e) = self.api.logout(&token).await {
                log::warn!("Backend logout failed, clearing local session anyway: {e}");
            }
        }

        self.store.clear().await;
        self.publish(|s| *s = Session::default());
    }

    /// User-triggered identity refresh: a single attempt with no retry
    /// escalation. Failure records `last_error` and leaves the existing
    /// session intact rather than logging the user out.
    pub async fn refresh_profile(&self) -> Result<User, SessionError> {
        let _guard = self.transition.lock().await;

        let token = match self.state.borrow().token.clone() {
            Some(token) => token,
            None => return Err(SessionError::NotAuthenticated),
        };

        self.publish(|s| {
            s.stage = Stage::Revalidating;
            s.is_loading = true;
        });

        match self.api.current_user(&token).await {
            Ok(user) => {
                let refreshed = user.clone();
                self.publish(|s| {
                    s.user = Some(refreshed);
                    s.stage = Stage::Authenticated;
                    s.is_loading = false;
                    s.last_error = None;
                });

                Ok(user)
            }
            Err(e) => {
                log::debug!("Profile refresh failed: {e}");

                let err = SessionError::RefreshFailed(e);
                let msg = err.to_string();
                self.publish(|s| {
                    s.stage = Stage::Authenticated;
                    s.is_loading = false;
                    s.last_error = Some(msg);
                });

                Err(err)
            }
        }
    }
}
