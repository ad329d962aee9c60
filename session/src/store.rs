//! The session lifecycle.
//!
//! [`SessionStore`] is the sole reader and writer of session records. It
//! creates a record when a flow begins, looks it up during later steps, and
//! attaches an authorization code once the user completes the flow.
//!
//! # Example
//!
//! ```
//! use authflow_session::config::SessionConfig;
//! use authflow_session::environment::StaticConfigProvider;
//! use authflow_session::mocks::{MockSessionTable, test_clock};
//! use authflow_session::{SessionRequestSummary, SessionStore};
//!
//! # async fn example() -> authflow_session::Result<()> {
//! let store = SessionStore::new(
//!     MockSessionTable::new(),
//!     StaticConfigProvider::new(SessionConfig::default(), test_clock()),
//! );
//!
//! let session_id = store
//!     .create_session(SessionRequestSummary::new().with_state("xyz"))
//!     .await?;
//!
//! let mut session = store.get_session(Some(session_id.as_str())).await?;
//! store.issue_authorization_code(&mut session).await?;
//! assert!(session.authorization_code.is_some());
//! # Ok(())
//! # }
//! ```

use crate::config::{ExpiryPolicy, ReissuePolicy};
use crate::error::{Result, SessionError};
use crate::providers::{ConfigurationProvider, SessionTable};
use crate::state::{
    AuthorizationCode, IssuedAuthorizationCode, Session, SessionId, SessionRequestSummary,
    SessionUpdate,
};
use chrono::SubsecRound;

/// Session lifecycle over an injected table and configuration provider.
///
/// Holds no mutable state of its own; every operation is a round trip to
/// the table, so concurrent callers are ordered by the table alone.
#[derive(Debug, Clone)]
pub struct SessionStore<T, P>
where
    T: SessionTable,
    P: ConfigurationProvider,
{
    table: T,
    config: P,
}

impl<T, P> SessionStore<T, P>
where
    T: SessionTable,
    P: ConfigurationProvider,
{
    /// Create a session store from its collaborators.
    #[must_use]
    pub const fn new(table: T, config: P) -> Self {
        Self { table, config }
    }

    /// The underlying table.
    #[must_use]
    pub const fn table(&self) -> &T {
        &self.table
    }

    /// The configuration provider.
    #[must_use]
    pub const fn config(&self) -> &P {
        &self.config
    }

    /// Create a session record for a flow that is starting.
    ///
    /// The record gets a fresh random identifier, `attemptCount = 0`, no
    /// authorization code, and the caller's fields unchanged. The write only
    /// succeeds if the identifier is unused; on a collision a new identifier
    /// is generated, up to the provider's `max_create_attempts`.
    ///
    /// # Returns
    ///
    /// The identifier of the new record.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The table write fails → `SessionError::StoreUnavailable` (not retried)
    /// - Every identifier collided → `SessionError::SessionIdCollision`
    /// - The session expiry is not after the creation time, or cannot be
    ///   represented → `SessionError::InvalidConfiguration`
    pub async fn create_session(&self, request: SessionRequestSummary) -> Result<SessionId> {
        let table = self.config.session_table_name();
        let created_date = self.config.now();
        let expiry_date = self.config.session_expiration()?;

        if expiry_date.trunc_subsecs(0) <= created_date.trunc_subsecs(0) {
            return Err(SessionError::InvalidConfiguration(format!(
                "session expiry {expiry_date} is not after creation time {created_date}"
            )));
        }

        let max_attempts = self.config.max_create_attempts().max(1);
        let mut session =
            Session::from_request(SessionId::new(), request, created_date, expiry_date);

        for attempt in 1..=max_attempts {
            if self.table.put_if_absent(table, &session).await? {
                tracing::info!(
                    session_id = %session.session_id,
                    table = table,
                    expiry_date = %session.expiry_date,
                    "Created session"
                );
                return Ok(session.session_id);
            }

            tracing::warn!(
                session_id = %session.session_id,
                table = table,
                attempt = attempt,
                "Session ID already taken, generating a new one"
            );
            session.session_id = SessionId::new();
        }

        Err(SessionError::SessionIdCollision {
            attempts: max_attempts,
        })
    }

    /// Look up a session by identifier.
    ///
    /// An absent or empty identifier is treated as unknown without touching
    /// the table. Expired records are returned as stored unless the provider
    /// selects [`ExpiryPolicy::EnforceOnRead`].
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No record exists for the identifier → `SessionError::SessionNotFound`
    /// - The record is expired under `EnforceOnRead` → `SessionError::SessionExpired`
    /// - The table read fails → `SessionError::StoreUnavailable`
    /// - The stored item cannot be decoded → `SessionError::Serialization`
    pub async fn get_session(&self, session_id: Option<&str>) -> Result<Session> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            tracing::debug!("Session lookup without an identifier");
            return Err(SessionError::SessionNotFound);
        };

        let session_id = SessionId::from(session_id);
        let table = self.config.session_table_name();

        let Some(session) = self.table.get(table, &session_id).await? else {
            tracing::debug!(session_id = %session_id, table = table, "Session not found");
            return Err(SessionError::SessionNotFound);
        };

        if self.config.expiry_policy() == ExpiryPolicy::EnforceOnRead {
            let now = self.config.now();
            if session.is_expired_at(now) {
                tracing::warn!(
                    session_id = %session_id,
                    expiry_date = %session.expiry_date,
                    now = %now,
                    "Session expired"
                );
                return Err(SessionError::SessionExpired);
            }
        }

        tracing::debug!(session_id = %session_id, table = table, "Loaded session");
        Ok(session)
    }

    /// Attach a new authorization code to a session.
    ///
    /// Sets `authorizationCode` and `authorizationCodeExpiryDate` together in
    /// one partial update, then mirrors them into `session`. Any previously
    /// issued code is overwritten unless the provider selects
    /// [`ReissuePolicy::RejectActive`]. The stored record is not re-read
    /// first; `session` must come from [`get_session`](Self::get_session) or
    /// [`create_session`](Self::create_session).
    ///
    /// `session` is left untouched when the call fails.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The table update fails → `SessionError::StoreUnavailable`
    /// - No record exists for `session.session_id` → `SessionError::SessionNotFound`
    /// - `session` holds an unexpired code under `RejectActive` →
    ///   `SessionError::AuthorizationCodeActive`
    /// - The code expiry is not after the issuance time (or the session's
    ///   creation time, if later), or cannot be represented →
    ///   `SessionError::InvalidConfiguration`
    pub async fn issue_authorization_code(&self, session: &mut Session) -> Result<()> {
        let table = self.config.session_table_name();
        let now = self.config.now();

        if self.config.reissue_policy() == ReissuePolicy::RejectActive
            && session.has_active_authorization_code(now)
        {
            tracing::warn!(
                session_id = %session.session_id,
                "Refusing to replace an active authorization code"
            );
            return Err(SessionError::AuthorizationCodeActive);
        }

        // A code valid past `now` is also valid past `createdDate`
        let issued_at = now.trunc_subsecs(0).max(session.created_date);
        let expires_at = self.config.authorization_code_expiration()?.trunc_subsecs(0);
        if expires_at <= issued_at {
            return Err(SessionError::InvalidConfiguration(format!(
                "authorization code expiry {expires_at} is not after issuance at {issued_at}"
            )));
        }

        let update = SessionUpdate::AuthorizationCode(IssuedAuthorizationCode {
            code: AuthorizationCode::new(),
            expires_at,
        });

        if !self.table.update(table, &session.session_id, &update).await? {
            tracing::debug!(
                session_id = %session.session_id,
                table = table,
                "No session to attach authorization code to"
            );
            return Err(SessionError::SessionNotFound);
        }

        update.apply(session);

        tracing::info!(
            session_id = %session.session_id,
            table = table,
            code_expiry = %expires_at,
            "Issued authorization code"
        );

        Ok(())
    }
}
