//! Storage implementations for session records.
//!
//! - **Session Table** (Redis) - JSON items with TTL eviction at `expiryDate`

pub mod session_redis;

// Re-exports
pub use session_redis::RedisSessionTable;
