//! In-memory [`NoteStore`] for tests and embedding.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`. An insertion sequence number
//! breaks ties between notes updated in the same millisecond.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Note, NoteDraft, NoteUpdate};

use super::{new_id, now_millis, NoteStore};

struct StoredNote {
    note: Note,
    seq: u64,
}

pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<String, StoredNote>>,
    next_seq: AtomicU64,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }
}

impl Default for InMemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("note store lock poisoned")
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
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
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut notes = self.notes.write().map_err(poisoned)?;
        notes.insert(
            note.id.clone(),
            StoredNote {
                note: note.clone(),
                seq,
            },
        );
        Ok(note)
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let notes = self.notes.read().map_err(poisoned)?;
        let mut stored: Vec<&StoredNote> = notes.values().collect();
        stored.sort_by(|a, b| {
            b.note
                .updated_at
                .cmp(&a.note.updated_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(stored.into_iter().map(|s| s.note.clone()).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Note>> {
        let notes = self.notes.read().map_err(poisoned)?;
        Ok(notes.get(id).map(|s| s.note.clone()))
    }

    async fn update(&self, id: &str, update: NoteUpdate) -> Result<Option<Note>> {
        let mut notes = self.notes.write().map_err(poisoned)?;
        let Some(stored) = notes.get_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            stored.note.title = title;
        }
        if let Some(content) = update.content {
            stored.note.content = content;
        }
        stored.note.updated_at = now_millis();
        Ok(Some(stored.note.clone()))
    }

    async fn set_summary(&self, id: &str, summary: &str) -> Result<Option<Note>> {
        let mut notes = self.notes.write().map_err(poisoned)?;
        let Some(stored) = notes.get_mut(id) else {
            return Ok(None);
        };
        stored.note.summary = summary.to_string();
        stored.note.updated_at = now_millis();
        Ok(Some(stored.note.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut notes = self.notes.write().map_err(poisoned)?;
        Ok(notes.remove(id).is_some())
    }
}
