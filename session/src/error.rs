//! Error types for session operations.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure modes of the session lifecycle.
///
/// Every error is surfaced to the immediate caller as-is. Nothing in this
/// crate retries a failed store call or swallows an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// No record exists for the identifier (or no identifier was given).
    #[error("Session not found")]
    SessionNotFound,

    /// The record exists but its `expiryDate` has passed.
    ///
    /// Only produced when reads enforce freshness
    /// (see [`ExpiryPolicy::EnforceOnRead`](crate::config::ExpiryPolicy)).
    #[error("Session has expired")]
    SessionExpired,

    // ═══════════════════════════════════════════════════════════
    // Write Errors
    // ═══════════════════════════════════════════════════════════

    /// Every generated session identifier collided with an existing record.
    #[error("Session ID collided with an existing record {attempts} times")]
    SessionIdCollision {
        /// Number of identifiers tried
        attempts: u32,
    },

    /// The session already carries an authorization code that has not expired.
    ///
    /// Only produced under
    /// [`ReissuePolicy::RejectActive`](crate::config::ReissuePolicy).
    #[error("Session already has an active authorization code")]
    AuthorizationCodeActive,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// The key-value store could not complete the operation.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored item could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The configuration produced values that would break record invariants.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SessionError {
    /// Returns `true` if the session does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// # use authflow_session::SessionError;
    /// assert!(SessionError::SessionNotFound.is_not_found());
    /// assert!(!SessionError::SessionExpired.is_not_found());
    /// ```
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::SessionNotFound)
    }

    /// Returns `true` if the failure came from the store's infrastructure.
    ///
    /// Callers may choose to retry these; this crate never does.
    ///
    /// # Examples
    ///
    /// ```
    /// # use authflow_session::SessionError;
    /// assert!(SessionError::StoreUnavailable("timeout".into()).is_transient());
    /// assert!(!SessionError::SessionNotFound.is_transient());
    /// ```
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
