//! Service-level errors shared by the note and summarize operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("{0}")]
    Validation(String),

    #[error("Note not found")]
    NotFound,

    /// No API key is configured, so summaries can't be produced at all.
    #[error("{0}")]
    SummarizerUnavailable(String),

    #[error("summarizer request failed: {0:#}")]
    Summarizer(anyhow::Error),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

pub type NotesResult<T> = std::result::Result<T, NotesError>;
