//! Shared application state: the signed-in caller and where records live.
//!
//! Command handlers borrow `CoreState`, check the session, then open a
//! record store for the duration of one request.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use uuid::Uuid;

use crate::config::{self, EngineConfig};
use crate::db::{self, SqliteRecordStore};

/// The authenticated caller. Supplied by the host's auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: Uuid,
    pub display_name: String,
}

impl UserSession {
    pub fn new(user_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

/// Uses `RwLock` for the session so concurrent requests read it without
/// blocking each other; only sign-in and sign-out write.
pub struct CoreState {
    session: RwLock<Option<UserSession>>,
    db_path: PathBuf,
    pub engine: EngineConfig,
}

impl CoreState {
    /// State backed by the configured database path.
    pub fn new() -> Self {
        Self::with_database(config::database_path())
    }

    pub fn with_database(db_path: impl Into<PathBuf>) -> Self {
        Self {
            session: RwLock::new(None),
            db_path: db_path.into(),
            engine: EngineConfig::default(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ── Session ─────────────────────────────────────────────

    pub fn read_session(&self) -> Result<RwLockReadGuard<'_, Option<UserSession>>, CoreError> {
        self.session.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn set_session(&self, session: UserSession) -> Result<(), CoreError> {
        let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        tracing::info!(user_id = %session.user_id, "Session started");
        *guard = Some(session);
        Ok(())
    }

    pub fn clear_session(&self) -> Result<(), CoreError> {
        let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        *guard = None;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Id of the signed-in caller.
    pub fn require_user(&self) -> Result<Uuid, CoreError> {
        let guard = self.read_session()?;
        guard
            .as_ref()
            .map(|s| s.user_id)
            .ok_or(CoreError::NotAuthenticated)
    }

    // ── Store access ────────────────────────────────────────

    /// Open the record store, running migrations if needed.
    pub fn open_store(&self) -> Result<SqliteRecordStore, CoreError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CoreError::Storage(format!("{}: {e}", parent.display())))?;
            }
        }
        Ok(SqliteRecordStore::open(&self.db_path)?)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_unauthenticated() {
        let state = CoreState::with_database("/tmp/unused.db");
        assert!(!state.is_authenticated());
        assert!(matches!(state.require_user(), Err(CoreError::NotAuthenticated)));
    }

    #[test]
    fn session_round_trip() {
        let state = CoreState::with_database("/tmp/unused.db");
        let user = Uuid::new_v4();
        state.set_session(UserSession::new(user, "Dr. Reis")).unwrap();
        assert_eq!(state.require_user().unwrap(), user);

        state.clear_session().unwrap();
        assert!(!state.is_authenticated());
    }

    #[test]
    fn open_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.db");
        let state = CoreState::with_database(&path);
        let store = state.open_store().unwrap();
        assert_eq!(db::count_tables(store.connection()).unwrap(), 8);
        assert!(path.exists());
    }

    #[test]
    fn not_authenticated_message_is_public() {
        assert_eq!(CoreError::NotAuthenticated.to_string(), "User not authenticated");
    }
}
