//! Collaborator traits.
//!
//! `SessionStore` depends on two external collaborators, both injected at
//! construction:
//!
//! ```text
//! ┌───────────────────────┐      ┌───────────────────────┐
//! │ ConfigurationProvider │      │ SessionTable          │
//! │ - table name          │      │ - put / put_if_absent │
//! │ - now                 │      │ - get                 │
//! │ - expiry instants     │      │ - update              │
//! └───────────┬───────────┘      └───────────┬───────────┘
//!             │                              │
//!             └──────────────┬───────────────┘
//!                            ▼
//!                  ┌───────────────────┐
//!                  │ SessionStore      │
//!                  └───────────────────┘
//! ```
//!
//! This enables:
//! - **Testing**: in-memory table and fixed clock (see `mocks`)
//! - **Production**: Redis table (see `stores`) and the system clock

pub mod config;
pub mod table;

pub use config::ConfigurationProvider;
pub use table::SessionTable;
