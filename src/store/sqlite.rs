//! SQLite-backed [`NoteStore`].
//!
//! Timestamps are stored as integer milliseconds since the epoch.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{from_millis, Note, NoteDraft, NoteUpdate};

use super::{new_id, now_millis, NoteStore};

const NOTE_COLUMNS: &str = "id, title, content, summary, created_at, updated_at";

pub struct SqliteNoteStore {
    pool: SqlitePool,
}

impl SqliteNoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_note(row: &SqliteRow) -> Note {
    let created_at: i64 = row.get("created_at");
    let updated_at: i64 = row.get("updated_at");
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        summary: row.get("summary"),
        created_at: from_millis(created_at),
        updated_at: from_millis(updated_at),
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn insert(&self, draft: NoteDraft) -> Result<Note> {
        let now = now_millis();
        let note = Note {
            id: new_id(),
            title: draft.title,
            content: draft.content,
            summary: String::new(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO notes (id, title, content, summary, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.summary)
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(note)
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notes ORDER BY updated_at DESC, rowid DESC",
            NOTE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_note).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_note))
    }

    async fn update(&self, id: &str, update: NoteUpdate) -> Result<Option<Note>> {
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = COALESCE(?, title),
                content = COALESCE(?, content),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.content)
        .bind(now_millis().timestamp_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn set_summary(&self, id: &str, summary: &str) -> Result<Option<Note>> {
        let result = sqlx::query("UPDATE notes SET summary = ?, updated_at = ? WHERE id = ?")
            .bind(summary)
            .bind(now_millis().timestamp_millis())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
