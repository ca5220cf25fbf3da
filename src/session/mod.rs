//! Admin session manager.
//!
//! Holds at most one [`AuthSession`], mirrors it into a [`LocalStore`] and leaves
//! every authentication decision to the remote procedures behind
//! [`SessionProcedures`]. Nothing here fails outwardly: remote and storage errors
//! become a failed [`LoginOutcome`], `false`, or a logged warning.

mod token;
mod types;

pub use self::token::generate_session_token;
pub use self::types::{AdminUser, AuthSession, LoginOutcome};

use crate::{backend::BackendError, storage::LocalStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, instrument, warn};

/// Well-known key holding the serialized session.
pub const SESSION_STORAGE_KEY: &str = "admin_session";

/// Lifetime requested for newly created sessions.
pub const SESSION_TTL_HOURS: i64 = 24;

const LOGIN_FAILED: &str = "Login failed";
const CREATE_SESSION_FAILED: &str = "Failed to create session";

/// Remote procedures the session manager delegates to.
#[async_trait]
pub trait SessionProcedures: Send + Sync {
    /// Check credentials; a rejected login is `Ok` with `success == false`.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, BackendError>;

    /// Persist a session record server-side.
    async fn create_session(
        &self,
        user_id: &str,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), BackendError>;

    /// Invalidate a session record server-side.
    async fn invalidate_session(&self, session_token: &str) -> Result<(), BackendError>;

    /// Ask whether a session token is still valid.
    async fn validate_session_token(&self, session_token: &str) -> Result<bool, BackendError>;
}

#[async_trait]
impl<T: SessionProcedures + ?Sized> SessionProcedures for Arc<T> {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, BackendError> {
        (**self).verify_credentials(email, password).await
    }

    async fn create_session(
        &self,
        user_id: &str,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        (**self)
            .create_session(user_id, session_token, expires_at)
            .await
    }

    async fn invalidate_session(&self, session_token: &str) -> Result<(), BackendError> {
        (**self).invalidate_session(session_token).await
    }

    async fn validate_session_token(&self, session_token: &str) -> Result<bool, BackendError> {
        (**self).validate_session_token(session_token).await
    }
}

pub struct SessionManager<P, S> {
    procedures: P,
    store: S,
    session: RwLock<Option<AuthSession>>,
}

impl<P, S> SessionManager<P, S>
where
    P: SessionProcedures,
    S: LocalStore,
{
    /// Build a manager and restore any session left in `store`.
    ///
    /// A stored entry that does not parse is removed and ignored.
    pub fn new(procedures: P, store: S) -> Self {
        let session = restore(&store);
        Self {
            procedures,
            store,
            session: RwLock::new(session),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> LoginOutcome {
        let outcome = match self.procedures.verify_credentials(email, password).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("credential check failed: {err}");
                return LoginOutcome::failed(LOGIN_FAILED);
            }
        };

        if !outcome.success {
            return LoginOutcome::failed(outcome.message.unwrap_or_else(|| LOGIN_FAILED.into()));
        }

        let Some(user) = outcome.user else {
            warn!("login procedure reported success without a user");
            return LoginOutcome::failed(LOGIN_FAILED);
        };

        let session_token = match generate_session_token() {
            Ok(token) => token,
            Err(err) => {
                warn!("failed to generate session token: {err}");
                return LoginOutcome::failed(LOGIN_FAILED);
            }
        };
        let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);

        if let Err(err) = self
            .procedures
            .create_session(&user.id, &session_token, expires_at)
            .await
        {
            debug!("create session failed: {err}");
            return LoginOutcome::failed(CREATE_SESSION_FAILED);
        }

        let session = AuthSession {
            user: user.clone(),
            session_token,
            expires_at,
        };
        self.persist(&session);
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);

        LoginOutcome::succeeded(user)
    }

    /// Best-effort server-side invalidation, then unconditional local clear.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(session) = self.session() {
            if let Err(err) = self
                .procedures
                .invalidate_session(&session.session_token)
                .await
            {
                debug!("ignoring logout failure: {err}");
            }
        }

        self.clear();
    }

    /// Ask the server whether the held session is still valid; clears it if not.
    #[instrument(skip(self))]
    pub async fn validate_session(&self) -> bool {
        let Some(session) = self.session() else {
            return false;
        };

        match self
            .procedures
            .validate_session_token(&session.session_token)
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                debug!("session rejected by server");
                self.clear();
                false
            }
            Err(err) => {
                debug!("session validation failed: {err}");
                self.clear();
                false
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while a session is held; says nothing about server-side validity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn persist(&self, session: &AuthSession) {
        let result = serde_json::to_string(session)
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.store
                    .set(SESSION_STORAGE_KEY, &json)
                    .map_err(|err| err.to_string())
            });

        if let Err(err) = result {
            warn!("failed to persist admin session: {err}");
        }
    }

    fn clear(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Err(err) = self.store.remove(SESSION_STORAGE_KEY) {
            warn!("failed to remove persisted admin session: {err}");
        }
    }
}

fn restore<S: LocalStore>(store: &S) -> Option<AuthSession> {
    let raw = match store.get(SESSION_STORAGE_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!("failed to read persisted admin session: {err}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            debug!("discarding unreadable admin session: {err}");
            if let Err(err) = store.remove(SESSION_STORAGE_KEY) {
                warn!("failed to remove unreadable admin session: {err}");
            }
            None
        }
    }
}
