//! Redis-based session table implementation.
//!
//! # Architecture
//!
//! Records are stored in Redis with:
//! - **Primary key**: `{table}:{session_id}` → JSON-serialized `Session`
//! - **Expiry**: `EXAT expiryDate`, so Redis evicts the record once the
//!   session has expired
//! - **Conditional create**: `SET NX` (single atomic command)
//! - **Partial update**: Lua script merging attributes into the stored item
//!
//! # Example
//!
//! ```no_run
//! use authflow_session::stores::RedisSessionTable;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = RedisSessionTable::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SessionError};
use crate::providers::SessionTable;
use crate::state::{Session, SessionId, SessionUpdate};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ExistenceCheck, SetExpiry, SetOptions};

/// Merge a JSON attribute set into an existing item, keeping its TTL.
///
/// Returns 1 if the item existed, 0 otherwise. A missing item is left
/// missing rather than created with only the updated attributes.
const UPDATE_SCRIPT: &str = r"
    local current = redis.call('GET', KEYS[1])
    if not current then
        return 0
    end

    local item = cjson.decode(current)
    local attributes = cjson.decode(ARGV[1])
    for name, value in pairs(attributes) do
        item[name] = value
    end

    redis.call('SET', KEYS[1], cjson.encode(item), 'KEEPTTL')
    return 1
";

/// Redis-based session table.
///
/// Provides:
/// - Session storage with eviction at the session's expiry
/// - Create-if-absent for collision-safe identifiers
/// - Atomic attribute updates
/// - Connection pooling via `ConnectionManager`
///
/// # Thread Safety
///
/// This type is `Clone` and can be shared across tasks. Clones share the
/// same `ConnectionManager`.
#[derive(Clone)]
pub struct RedisSessionTable {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
    update_script: redis::Script,
}

impl RedisSessionTable {
    /// Create a new Redis session table.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            SessionError::StoreUnavailable(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            SessionError::StoreUnavailable(format!(
                "Failed to create Redis connection manager: {e}"
            ))
        })?;

        tracing::info!("RedisSessionTable initialized successfully");

        Ok(Self::from_connection_manager(conn_manager))
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub fn from_connection_manager(conn_manager: ConnectionManager) -> Self {
        Self {
            conn_manager,
            update_script: redis::Script::new(UPDATE_SCRIPT),
        }
    }

    /// Get the Redis key for a session.
    fn item_key(table: &str, session_id: &SessionId) -> String {
        format!("{table}:{session_id}")
    }

    /// Redis expiry options for a record: absolute, at the session's expiry.
    fn expiry(session: &Session) -> SetExpiry {
        #[allow(clippy::cast_sign_loss)]
        let expire_at = session.expiry_date.timestamp().max(1) as u64;
        SetExpiry::EXAT(expire_at)
    }
}

impl SessionTable for RedisSessionTable {
    async fn put(&self, table: &str, session: &Session) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let item_key = Self::item_key(table, &session.session_id);
        let item = serde_json::to_string(session)?;

        let options = SetOptions::default().with_expiration(Self::expiry(session));
        let _: () = conn
            .set_options(&item_key, item, options)
            .await
            .map_err(|e| SessionError::StoreUnavailable(format!("Failed to put session: {e}")))?;

        tracing::debug!(session_id = %session.session_id, table = table, "Put session item");

        Ok(())
    }

    async fn put_if_absent(&self, table: &str, session: &Session) -> Result<bool> {
        let mut conn = self.conn_manager.clone();
        let item_key = Self::item_key(table, &session.session_id);
        let item = serde_json::to_string(session)?;

        // SET NX replies nil when the key already exists
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(Self::expiry(session));
        let reply: Option<String> = conn
            .set_options(&item_key, item, options)
            .await
            .map_err(|e| SessionError::StoreUnavailable(format!("Failed to create session: {e}")))?;

        let created = reply.is_some();
        tracing::debug!(
            session_id = %session.session_id,
            table = table,
            created = created,
            "Conditional put of session item"
        );

        Ok(created)
    }

    async fn get(&self, table: &str, session_id: &SessionId) -> Result<Option<Session>> {
        let mut conn = self.conn_manager.clone();
        let item_key = Self::item_key(table, session_id);

        let item: Option<String> = conn.get(&item_key).await.map_err(|e| {
            SessionError::StoreUnavailable(format!("Failed to get session from Redis: {e}"))
        })?;

        match item {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        table: &str,
        session_id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<bool> {
        let mut conn = self.conn_manager.clone();
        let item_key = Self::item_key(table, session_id);
        let attributes = serde_json::to_string(&update.to_attributes()?)?;

        let matched: i64 = self
            .update_script
            .key(&item_key)
            .arg(attributes)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| SessionError::StoreUnavailable(format!("Failed to update session: {e}")))?;

        tracing::debug!(
            session_id = %session_id,
            table = table,
            matched = matched == 1,
            "Updated session item"
        );

        Ok(matched == 1)
    }
}
