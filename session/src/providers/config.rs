//! Configuration provider trait.

use crate::config::{ExpiryPolicy, ReissuePolicy};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Source of the named values the session lifecycle needs.
///
/// Expiry lookups return absolute instants for something created "now",
/// so an implementation that reads the clock must use the same clock for
/// [`now`](Self::now).
pub trait ConfigurationProvider: Send + Sync {
    /// Table (key namespace) holding session records.
    fn session_table_name(&self) -> &str;

    /// Current time.
    fn now(&self) -> DateTime<Utc>;

    /// Absolute expiry for a session created now.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidConfiguration` if the expiry cannot be
    /// represented.
    fn session_expiration(&self) -> Result<DateTime<Utc>>;

    /// Absolute expiry for an authorization code issued now.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidConfiguration` if the expiry cannot be
    /// represented.
    fn authorization_code_expiration(&self) -> Result<DateTime<Utc>>;

    /// Freshness handling on reads.
    fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::default()
    }

    /// Handling of repeated code issuance.
    fn reissue_policy(&self) -> ReissuePolicy {
        ReissuePolicy::default()
    }

    /// Identifiers a create may try before failing with a collision.
    fn max_create_attempts(&self) -> u32 {
        3
    }
}
