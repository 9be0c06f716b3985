//! Note CRUD operations.
//!
//! Thin validation layer between the HTTP handlers and a [`NoteStore`].
//! Titles are trimmed; content is stored verbatim. Empty titles or content
//! are rejected.

use crate::error::{NotesError, NotesResult};
use crate::models::{NewNote, Note, NoteDraft, NoteUpdate};
use crate::store::NoteStore;

const REQUIRED_MESSAGE: &str = "title and content required";

fn validate_new(input: NewNote) -> NotesResult<NoteDraft> {
    let title = input.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let content = input.content.unwrap_or_default();

    if title.is_empty() || content.is_empty() {
        return Err(NotesError::Validation(REQUIRED_MESSAGE.to_string()));
    }

    Ok(NoteDraft { title, content })
}

fn validate_update(input: NoteUpdate) -> NotesResult<NoteUpdate> {
    let title = match input.title {
        Some(t) => {
            let t = t.trim().to_string();
            if t.is_empty() {
                return Err(NotesError::Validation("title must not be empty".to_string()));
            }
            Some(t)
        }
        None => None,
    };

    if input.content.as_deref().is_some_and(str::is_empty) {
        return Err(NotesError::Validation("content must not be empty".to_string()));
    }

    Ok(NoteUpdate {
        title,
        content: input.content,
    })
}

pub async fn create_note(store: &dyn NoteStore, input: NewNote) -> NotesResult<Note> {
    let draft = validate_new(input)?;
    let note = store.insert(draft).await?;
    tracing::debug!(id = %note.id, "created note");
    Ok(note)
}

pub async fn list_notes(store: &dyn NoteStore) -> NotesResult<Vec<Note>> {
    Ok(store.list().await?)
}

pub async fn get_note(store: &dyn NoteStore, id: &str) -> NotesResult<Note> {
    store.get(id).await?.ok_or(NotesError::NotFound)
}

pub async fn update_note(store: &dyn NoteStore, id: &str, input: NoteUpdate) -> NotesResult<Note> {
    let update = validate_update(input)?;
    let note = store.update(id, update).await?.ok_or(NotesError::NotFound)?;
    tracing::debug!(id = %note.id, "updated note");
    Ok(note)
}

pub async fn delete_note(store: &dyn NoteStore, id: &str) -> NotesResult<()> {
    if !store.delete(id).await? {
        return Err(NotesError::NotFound);
    }
    tracing::debug!(id, "deleted note");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryNoteStore;

    #[tokio::test]
    async fn test_create_trims_title() {
        let store = InMemoryNoteStore::new();
        let note = create_note(&store, NewNote::new("  Ideas  ", "body"))
            .await
            .unwrap();
        assert_eq!(note.title, "Ideas");
        assert_eq!(note.content, "body");
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let store = InMemoryNoteStore::new();

        for input in [
            NewNote::default(),
            NewNote { title: Some("t".into()), content: None },
            NewNote { title: None, content: Some("c".into()) },
            NewNote::new("   ", "c"),
            NewNote::new("t", ""),
        ] {
            let err = create_note(&store, input).await.unwrap_err();
            assert!(
                matches!(err, NotesError::Validation(ref m) if m == "title and content required"),
                "unexpected error: {:?}",
                err
            );
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_partial_and_validation() {
        let store = InMemoryNoteStore::new();
        let note = create_note(&store, NewNote::new("t", "c")).await.unwrap();

        let updated = update_note(
            &store,
            &note.id,
            NoteUpdate { title: Some(" new ".into()), content: None },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.content, "c");

        let err = update_note(
            &store,
            &note.id,
            NoteUpdate { title: Some("".into()), content: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, NotesError::Validation(_)));

        let err = update_note(
            &store,
            &note.id,
            NoteUpdate { title: None, content: Some("".into()) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, NotesError::Validation(_)));
    }

    #[tokio::test]
    async fn test_whitespace_content_is_kept_verbatim() {
        let store = InMemoryNoteStore::new();
        let note = create_note(&store, NewNote::new("t", "   ")).await.unwrap();
        assert_eq!(note.content, "   ");

        let updated = update_note(
            &store,
            &note.id,
            NoteUpdate { title: None, content: Some("\n\t".into()) },
        )
        .await
        .unwrap();
        assert_eq!(updated.content, "\n\t");
    }

    #[tokio::test]
    async fn test_not_found() {
        let store = InMemoryNoteStore::new();
        assert!(matches!(get_note(&store, "x").await, Err(NotesError::NotFound)));
        assert!(matches!(
            update_note(&store, "x", NoteUpdate::default()).await,
            Err(NotesError::NotFound)
        ));
        assert!(matches!(delete_note(&store, "x").await, Err(NotesError::NotFound)));
    }
}
