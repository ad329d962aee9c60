//! Mock session table for testing.

use crate::error::{Result, SessionError};
use crate::providers::SessionTable;
use crate::state::{Session, SessionId, SessionUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type ItemKey = (String, SessionId);

#[derive(Debug, Default)]
struct Faults {
    /// Error message returned by every call while set.
    unavailable: Option<String>,
    /// Upcoming `put_if_absent` calls that report the key as taken.
    forced_collisions: u32,
}

/// Mock session table.
///
/// Uses in-memory storage for testing. Supports scripted outages and
/// identifier collisions so error paths can be exercised.
#[derive(Debug, Clone, Default)]
pub struct MockSessionTable {
    items: Arc<Mutex<HashMap<ItemKey, Session>>>,
    faults: Arc<Mutex<Faults>>,
}

impl MockSessionTable {
    /// Create a new, empty mock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable(message)`.
    pub fn set_unavailable(&self, message: impl Into<String>) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.unavailable = Some(message.into());
        }
    }

    /// Undo [`set_unavailable`](Self::set_unavailable).
    pub fn set_available(&self) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.unavailable = None;
        }
    }

    /// Make the next `count` calls to `put_if_absent` report a collision.
    pub fn force_collisions(&self, count: u32) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.forced_collisions = count;
        }
    }

    /// Get count of stored items across all tables (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn item_count(&self) -> Result<usize> {
        Ok(self.lock_items()?.len())
    }

    /// Read an item directly, bypassing fault injection (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn stored(&self, table: &str, session_id: &SessionId) -> Result<Option<Session>> {
        Ok(self
            .lock_items()?
            .get(&(table.to_string(), session_id.clone()))
            .cloned())
    }

    fn lock_items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ItemKey, Session>>> {
        self.items
            .lock()
            .map_err(|_| SessionError::StoreUnavailable("Mutex lock failed".to_string()))
    }

    fn check_available(&self) -> Result<()> {
        let faults = self
            .faults
            .lock()
            .map_err(|_| SessionError::StoreUnavailable("Mutex lock failed".to_string()))?;

        match &faults.unavailable {
            Some(message) => Err(SessionError::StoreUnavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn take_forced_collision(&self) -> Result<bool> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|_| SessionError::StoreUnavailable("Mutex lock failed".to_string()))?;

        if faults.forced_collisions > 0 {
            faults.forced_collisions -= 1;
            return Ok(true);
        }
        Ok(false)
    }
}

impl SessionTable for MockSessionTable {
    async fn put(&self, table: &str, session: &Session) -> Result<()> {
        self.check_available()?;

        self.lock_items()?.insert(
            (table.to_string(), session.session_id.clone()),
            session.clone(),
        );
        Ok(())
    }

    async fn put_if_absent(&self, table: &str, session: &Session) -> Result<bool> {
        self.check_available()?;

        if self.take_forced_collision()? {
            return Ok(false);
        }

        let mut items = self.lock_items()?;
        let key = (table.to_string(), session.session_id.clone());
        if items.contains_key(&key) {
            return Ok(false);
        }

        items.insert(key, session.clone());
        Ok(true)
    }

    async fn get(&self, table: &str, session_id: &SessionId) -> Result<Option<Session>> {
        self.check_available()?;

        Ok(self
            .lock_items()?
            .get(&(table.to_string(), session_id.clone()))
            .cloned())
    }

    async fn update(
        &self,
        table: &str,
        session_id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<bool> {
        self.check_available()?;

        let mut items = self.lock_items()?;
        match items.get_mut(&(table.to_string(), session_id.clone())) {
            Some(session) => {
                update.apply(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
