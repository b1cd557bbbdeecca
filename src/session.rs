//! The session lifecycle: login, registration, restoration and logout.

use crate::{
    endpoints::{self, LoginError, ProfileError, RegisterError, Registration},
    storage::{
        SessionStorage, REFRESH_TOKEN_KEY, SESSION_KEYS, SESSION_START_KEY,
        TOKEN_KEY,
    },
    ApiClient, TokenPair, UserProfile,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::{
    fmt::{self, Debug, Formatter},
    io,
    sync::Arc,
};
use tokio::sync::watch;

/// Everything known about the current identity.
#[derive(Clone, PartialEq)]
#[non_exhaustive]
pub struct Session {
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub session_started_at: Option<DateTime<Utc>>,
    pub user: Option<UserProfile>,
    /// Set until the first time we know whether anyone is logged in.
    pub loading: bool,
    restoring: bool,
}

impl Session {
    fn initial() -> Self {
        Session {
            token: None,
            refresh_token: None,
            session_started_at: None,
            user: None,
            loading: true,
            restoring: false,
        }
    }

    /// The token is the source of truth.
    pub fn is_authenticated(&self) -> bool { self.token.is_some() }

    pub fn state(&self) -> SessionState {
        if self.restoring {
            SessionState::Restoring
        } else if self.loading {
            SessionState::Uninitialized
        } else if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// How long the session has been running, if it has a start time.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.session_started_at
            .map(|started| now.signed_duration_since(started))
    }

    fn clear(&mut self) {
        self.token = None;
        self.refresh_token = None;
        self.session_started_at = None;
        self.user = None;
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let redacted = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");

        f.debug_struct("Session")
            .field("token", &redacted(&self.token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .field("session_started_at", &self.session_started_at)
            .field("user", &self.user)
            .field("loading", &self.loading)
            .field("state", &self.state())
            .finish()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// We haven't looked for a stored session yet.
    Uninitialized,
    /// We have a token and are fetching its profile.
    Restoring,
    Authenticated,
    Anonymous,
}

/// Owns the session for the whole process.
///
/// Cloning is cheap and every clone shares the same state, so hand a clone
/// to whatever needs to know who is logged in.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

struct Shared {
    client: ApiClient,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<Session>,
}

impl SessionManager {
    pub fn new(client: ApiClient, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(Session::initial());

        SessionManager {
            shared: Arc::new(Shared {
                client,
                storage,
                state,
            }),
        }
    }

    pub fn client(&self) -> &ApiClient { &self.shared.client }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session { self.shared.state.borrow().clone() }

    /// Get notified whenever the session changes (e.g. to redirect to a
    /// login screen after the session is torn down).
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.state.subscribe()
    }

    pub fn token(&self) -> Option<String> {
        self.shared.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.shared.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.state.borrow().is_authenticated()
    }

    pub fn loading(&self) -> bool { self.shared.state.borrow().loading }

    pub fn state(&self) -> SessionState { self.shared.state.borrow().state() }

    pub fn session_elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.shared.state.borrow().elapsed(now)
    }

    /// Pick up a session persisted by an earlier run.
    ///
    /// Without a stored token this resolves immediately and never touches
    /// the network.
    pub async fn restore(&self) -> SessionState {
        let storage = &self.shared.storage;

        let token = match storage.get(TOKEN_KEY) {
            Some(token) => token,
            None => {
                log::debug!("No stored session");
                self.modify(|s| s.loading = false);
                return self.state();
            },
        };

        let refresh_token = storage.get(REFRESH_TOKEN_KEY);
        let started = storage
            .get(SESSION_START_KEY)
            .and_then(|raw| parse_millis(&raw));

        log::debug!("Restoring a stored session");
        self.modify(|s| {
            s.token = Some(token);
            s.refresh_token = refresh_token;
            s.session_started_at = started;
            s.user = None;
            s.restoring = true;
        });

        self.fetch_current_user().await;
        self.state()
    }

    /// Log in and start a new session.
    ///
    /// On success the tokens are persisted and the profile fetched. If that
    /// fetch is rejected the session is torn down again, so check
    /// [`SessionManager::is_authenticated()`] afterwards. Nothing is
    /// persisted when the credentials are refused.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), LoginError> {
        let tokens = endpoints::login(self.client(), username, password).await?;
        let started = Utc::now();

        self.persist(&tokens, started)?;
        self.modify(|s| {
            s.token = Some(tokens.access.clone());
            s.refresh_token = tokens.refresh.clone();
            s.session_started_at = Some(started);
            s.user = None;
            s.restoring = true;
        });
        log::info!("Logged in as {}", username);

        self.fetch_current_user().await;
        Ok(())
    }

    /// Create an account. This doesn't log the new user in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Value, RegisterError> {
        let registration = Registration {
            username,
            email,
            password,
            password_confirm,
        };

        let created = endpoints::register(self.client(), &registration).await?;
        log::info!("Registered {}", username);

        Ok(created)
    }

    /// Forget everything about the current session. Calling this when
    /// nobody is logged in does nothing.
    pub fn logout(&self) {
        self.clear_storage();

        let was_authenticated = self.is_authenticated();
        self.modify(Session::clear);

        if was_authenticated {
            log::info!("Logged out");
        }
    }

    /// Re-fetch the profile, e.g. after changing something on it.
    pub async fn refresh_user(&self) { self.fetch_current_user().await }

    async fn fetch_current_user(&self) {
        let token = match self.token() {
            Some(token) => token,
            None => {
                self.modify(|s| s.loading = false);
                return;
            },
        };

        self.modify(|s| s.restoring = true);

        match endpoints::current_user(self.client(), &token).await {
            Ok(user) => {
                log::debug!("Fetched the profile for {}", user.username);
                self.modify(|s| {
                    // the session may have ended while we were waiting
                    if s.token.as_deref() == Some(token.as_str()) {
                        s.user = Some(user);
                    }
                });
            },
            Err(e @ ProfileError::Rejected { .. })
            | Err(e @ ProfileError::InvalidToken(_)) => {
                log::warn!("{}, ending the session", e);

                if self.token().as_deref() == Some(token.as_str()) {
                    self.logout();
                }
            },
            Err(e) => {
                log::error!("Unable to fetch the current user: {}", e);
            },
        }

        self.modify(|s| {
            s.restoring = false;
            s.loading = false;
        });
    }

    fn persist(
        &self,
        tokens: &TokenPair,
        started: DateTime<Utc>,
    ) -> io::Result<()> {
        let storage = &self.shared.storage;

        let result = storage
            .set(TOKEN_KEY, &tokens.access)
            .and_then(|_| match tokens.refresh {
                Some(ref refresh) => storage.set(REFRESH_TOKEN_KEY, refresh),
                None => storage.remove(REFRESH_TOKEN_KEY),
            })
            .and_then(|_| {
                storage.set(
                    SESSION_START_KEY,
                    &started.timestamp_millis().to_string(),
                )
            });

        if let Err(ref e) = result {
            log::error!("Unable to save the session: {}", e);
            self.clear_storage();
        }

        result
    }

    fn clear_storage(&self) {
        for key in SESSION_KEYS.iter() {
            if let Err(e) = self.shared.storage.remove(key) {
                log::warn!("Unable to remove \"{}\" from storage: {}", key, e);
            }
        }
    }

    fn modify<F>(&self, mutate: F)
    where
        F: FnOnce(&mut Session),
    {
        self.shared.state.send_modify(mutate);
    }
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("client", &self.shared.client)
            .field("session", &*self.shared.state.borrow())
            .finish()
    }
}

fn parse_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}
