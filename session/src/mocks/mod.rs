//! Mock collaborators for testing.
//!
//! In-memory, deterministic implementations of the collaborator traits for
//! unit and integration tests.

pub mod clock;
pub mod table;

pub use clock::{FixedClock, test_clock};
pub use table::MockSessionTable;
