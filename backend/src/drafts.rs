//! Persistence for each owner's draft template.
//!
//! A draft is stored whole, as its JSON form
//! (`{name?, htmlContent, tags: [{name, column}]}`), one row per owner.

use common::model::template::DraftTemplate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("draft storage failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored draft is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("draft storage is unavailable")]
    Poisoned,
}

pub trait DraftStore: Send + Sync {
    /// The owner's draft, or an empty one if nothing was saved yet.
    fn load(&self, owner: &str) -> Result<DraftTemplate, StoreError>;

    fn save(&self, owner: &str, draft: &DraftTemplate) -> Result<(), StoreError>;
}

pub struct SqliteDraftStore {
    conn: Mutex<Connection>,
}

impl SqliteDraftStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS drafts (
                owner      TEXT PRIMARY KEY,
                draft      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl DraftStore for SqliteDraftStore {
    fn load(&self, owner: &str) -> Result<DraftTemplate, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let stored: Option<String> = conn
            .query_row(
                "SELECT draft FROM drafts WHERE owner = ?1",
                params![owner],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(DraftTemplate::default()),
        }
    }

    fn save(&self, owner: &str, draft: &DraftTemplate) -> Result<(), StoreError> {
        let json = serde_json::to_string(draft)?;
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO drafts (owner, draft, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)",
            params![owner, json],
        )?;
        log::debug!("saved draft for {} ({} tags)", owner, draft.tags.len());
        Ok(())
    }
}
