//! Session configuration.
//!
//! Values are supplied by the application. How they are loaded (environment,
//! files, parameter store) is up to the caller; this module only holds them.

use chrono::Duration;

/// What `get_session` does with a record whose `expiryDate` has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Return the record as stored. Callers apply their own freshness check,
    /// and the store's TTL eviction removes the record eventually.
    #[default]
    CallerChecked,

    /// Fail the read with `SessionExpired`.
    EnforceOnRead,
}

/// What `issue_authorization_code` does when the session already has a code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReissuePolicy {
    /// Overwrite the previous code. The last write wins.
    #[default]
    Overwrite,

    /// Refuse with `AuthorizationCodeActive` while the held code is unexpired.
    RejectActive,
}

/// Session store configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the table (key namespace) holding session records.
    ///
    /// Default: `sessions`
    pub table_name: String,

    /// How long a session stays valid after creation.
    ///
    /// Default: 1 hour
    pub session_ttl: Duration,

    /// How long an authorization code stays valid after issuance.
    ///
    /// Default: 5 minutes
    pub authorization_code_ttl: Duration,

    /// Freshness handling on reads.
    ///
    /// Default: [`ExpiryPolicy::CallerChecked`]
    pub expiry_policy: ExpiryPolicy,

    /// Handling of repeated code issuance.
    ///
    /// Default: [`ReissuePolicy::Overwrite`]
    pub reissue_policy: ReissuePolicy,

    /// Identifiers tried before giving up on a colliding create.
    ///
    /// Default: 3
    pub max_create_attempts: u32,
}

impl SessionConfig {
    /// Create a configuration for the given table with default policies.
    ///
    /// # Arguments
    ///
    /// * `table_name` - Table (key namespace) holding session records
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Set the session time-to-live.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the authorization code time-to-live.
    #[must_use]
    pub const fn with_authorization_code_ttl(mut self, ttl: Duration) -> Self {
        self.authorization_code_ttl = ttl;
        self
    }

    /// Set the freshness policy for reads.
    #[must_use]
    pub const fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    /// Set the reissue policy for authorization codes.
    #[must_use]
    pub const fn with_reissue_policy(mut self, policy: ReissuePolicy) -> Self {
        self.reissue_policy = policy;
        self
    }

    /// Set how many identifiers a create may try. Values below 1 are raised to 1.
    #[must_use]
    pub const fn with_max_create_attempts(mut self, attempts: u32) -> Self {
        self.max_create_attempts = if attempts == 0 { 1 } else { attempts };
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            table_name: "sessions".to_string(),
            session_ttl: Duration::hours(1),
            authorization_code_ttl: Duration::minutes(5),
            expiry_policy: ExpiryPolicy::CallerChecked,
            reissue_policy: ReissuePolicy::Overwrite,
            max_create_attempts: 3,
        }
    }
}
