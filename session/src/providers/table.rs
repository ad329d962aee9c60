//! Session table trait.

use crate::error::Result;
use crate::state::{Session, SessionId, SessionUpdate};

/// Durable key-value store holding session records.
///
/// Records are addressed by `sessionId` within a named table. This trait
/// abstracts over the storage engine (Redis in production, memory in tests).
///
/// # Implementation Notes
///
/// - Every method is a single round trip; no retries
/// - Infrastructure failures map to `SessionError::StoreUnavailable`
/// - Expiry is the engine's concern (TTL eviction), not checked on reads
pub trait SessionTable: Send + Sync {
    /// Write a full item, replacing any item with the same key.
    ///
    /// An unconditional upsert. [`SessionStore`](crate::SessionStore) never
    /// calls it; it is kept for callers outside the store that seed or
    /// migrate records, such as re-encoding items in the current format.
    ///
    /// # Errors
    ///
    /// Returns error if the write cannot complete.
    fn put(
        &self,
        table: &str,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Write a full item only if no item with the same key exists.
    ///
    /// # Returns
    ///
    /// `true` if the item was created, `false` if the key was taken.
    ///
    /// # Errors
    ///
    /// Returns error if the write cannot complete.
    fn put_if_absent(
        &self,
        table: &str,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Read an item by key.
    ///
    /// # Returns
    ///
    /// The item if present, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The read cannot complete
    /// - The stored item cannot be decoded
    fn get(
        &self,
        table: &str,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Session>>> + Send;

    /// Set attributes on an existing item.
    ///
    /// Unconditional: concurrent updates to the same key are last-write-wins.
    ///
    /// # Returns
    ///
    /// `true` if an item with the key existed and was updated, `false` if
    /// there was nothing to update (no item is created).
    ///
    /// # Errors
    ///
    /// Returns error if the update cannot complete.
    fn update(
        &self,
        table: &str,
        session_id: &SessionId,
        update: &SessionUpdate,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}
