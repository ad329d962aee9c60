//! # Authflow Sessions
//!
//! Short-lived session records for an identity/authorization flow.
//!
//! A session is created when a client begins an authorization request,
//! looked up by identifier during the following steps, and receives a
//! single-use authorization code once the user completes the flow.
//!
//! ## Architecture
//!
//! [`SessionStore`] owns the lifecycle and is the only reader and writer of
//! session state. Its two collaborators are injected:
//!
//! ```text
//! create_session ─┐
//! get_session    ─┼─→ SessionStore ─→ SessionTable (Redis / in-memory)
//! issue_code     ─┘         │
//!                           └────────→ ConfigurationProvider (table, clock, TTLs)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use authflow_session::config::SessionConfig;
//! use authflow_session::environment::StaticConfigProvider;
//! use authflow_session::stores::RedisSessionTable;
//! use authflow_session::{SessionRequestSummary, SessionStore};
//!
//! # async fn example() -> authflow_session::Result<()> {
//! let store = SessionStore::new(
//!     RedisSessionTable::new("redis://127.0.0.1:6379").await?,
//!     StaticConfigProvider::with_system_clock(SessionConfig::new("sessions")),
//! );
//!
//! // 1. Flow begins
//! let session_id = store
//!     .create_session(
//!         SessionRequestSummary::new()
//!             .with_state("xyz")
//!             .with_client_id("c1")
//!             .with_redirect_uri("https://rp.example/cb"),
//!     )
//!     .await?;
//!
//! // 2. Later step looks it up
//! let mut session = store.get_session(Some(session_id.as_str())).await?;
//!
//! // 3. Flow completes
//! store.issue_authorization_code(&mut session).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod environment;
pub mod error;
pub mod providers;
pub mod state;
pub mod store;
pub mod stores;

// Mock collaborators (for testing)
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use error::{Result, SessionError};
pub use state::{
    AuthorizationCode, IssuedAuthorizationCode, Session, SessionId, SessionRequestSummary,
    SessionUpdate,
};
pub use store::SessionStore;
