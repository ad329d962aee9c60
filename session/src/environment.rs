//! Session environment.
//!
//! Time and configuration are injected rather than read from globals, so
//! tests can pin the clock and production can share one provider across
//! request handlers.

use crate::config::{ExpiryPolicy, ReissuePolicy, SessionConfig};
use crate::error::{Result, SessionError};
use crate::providers::ConfigurationProvider;
use chrono::{DateTime, Duration, Utc};

/// Clock trait - abstracts time operations for testability.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// [`ConfigurationProvider`] backed by a [`SessionConfig`] and a [`Clock`].
///
/// Expiry instants are `clock.now()` plus the configured TTL. A TTL that
/// pushes the instant out of range is reported as
/// `SessionError::InvalidConfiguration`.
///
/// # Examples
///
/// ```
/// use authflow_session::config::SessionConfig;
/// use authflow_session::environment::{StaticConfigProvider, SystemClock};
/// use authflow_session::providers::ConfigurationProvider;
///
/// let provider = StaticConfigProvider::new(SessionConfig::new("sessions"), SystemClock);
/// assert_eq!(provider.session_table_name(), "sessions");
/// assert!(provider.session_expiration().unwrap() > provider.now());
/// ```
#[derive(Debug, Clone)]
pub struct StaticConfigProvider<C: Clock> {
    config: SessionConfig,
    clock: C,
}

impl<C: Clock> StaticConfigProvider<C> {
    /// Create a provider from configuration and a clock.
    #[must_use]
    pub const fn new(config: SessionConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// The underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn expiration(&self, name: &str, ttl: Duration) -> Result<DateTime<Utc>> {
        let now = self.clock.now();
        now.checked_add_signed(ttl).ok_or_else(|| {
            SessionError::InvalidConfiguration(format!("{name} TTL {ttl} overflows from {now}"))
        })
    }
}

impl StaticConfigProvider<SystemClock> {
    /// Create a provider that reads the system clock.
    #[must_use]
    pub const fn with_system_clock(config: SessionConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> ConfigurationProvider for StaticConfigProvider<C> {
    fn session_table_name(&self) -> &str {
        &self.config.table_name
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn session_expiration(&self) -> Result<DateTime<Utc>> {
        self.expiration("session", self.config.session_ttl)
    }

    fn authorization_code_expiration(&self) -> Result<DateTime<Utc>> {
        self.expiration("authorization code", self.config.authorization_code_ttl)
    }

    fn expiry_policy(&self) -> ExpiryPolicy {
        self.config.expiry_policy
    }

    fn reissue_policy(&self) -> ReissuePolicy {
        self.config.reissue_policy
    }

    fn max_create_attempts(&self) -> u32 {
        self.config.max_create_attempts
    }
}
