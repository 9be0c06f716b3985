//! Storage abstraction for notes.
//!
//! The [`NoteStore`] trait covers every persistence operation the HTTP
//! handlers need, so the server can run against SQLite in production and
//! an in-memory map in tests.
//!
//! Implementations must be `Send + Sync` to be shared across handlers.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`insert`](NoteStore::insert) | Store a new note and assign its ID |
//! | [`list`](NoteStore::list) | All notes, most recently updated first |
//! | [`get`](NoteStore::get) | One note by ID |
//! | [`update`](NoteStore::update) | Apply a partial update |
//! | [`set_summary`](NoteStore::set_summary) | Overwrite the cached summary |
//! | [`delete`](NoteStore::delete) | Remove a note |

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{from_millis, Note, NoteDraft, NoteUpdate};

pub use memory::InMemoryNoteStore;
pub use sqlite::SqliteNoteStore;

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a validated note. Returns the stored note with ID and timestamps.
    async fn insert(&self, draft: NoteDraft) -> Result<Note>;

    /// All notes sorted by `updated_at` descending.
    async fn list(&self) -> Result<Vec<Note>>;

    async fn get(&self, id: &str) -> Result<Option<Note>>;

    /// Apply the present fields of `update` and refresh `updated_at`.
    /// The cached summary is left untouched. `None` if no such note.
    async fn update(&self, id: &str, update: NoteUpdate) -> Result<Option<Note>>;

    /// Overwrite the cached summary and refresh `updated_at`.
    async fn set_summary(&self, id: &str, summary: &str) -> Result<Option<Note>>;

    /// Returns `true` when a note was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Current time truncated to milliseconds, the precision both stores keep.
pub(crate) fn now_millis() -> DateTime<Utc> {
    from_millis(Utc::now().timestamp_millis())
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
