//! HTTP client for a running notes server.
//!
//! [`NotesClient`] wraps the REST API; the `run_*` functions back the
//! `notes list|get|create|edit|delete|summarize` commands and print to stdout.

use anyhow::{bail, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{NewNote, Note, NoteUpdate, SummaryResponse};

pub const DEFAULT_API: &str = "http://localhost:5000/api/notes";

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct NotesClient {
    base: String,
    http: reqwest::Client,
}

impl NotesClient {
    /// `base` is the notes collection URL, e.g. `http://localhost:5000/api/notes`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn note_url(&self, id: &str) -> String {
        format!("{}/{}", self.base, id)
    }

    pub async fn list(&self) -> Result<Vec<Note>> {
        decode(self.http.get(&self.base).send().await?).await
    }

    pub async fn get(&self, id: &str) -> Result<Note> {
        decode(self.http.get(self.note_url(id)).send().await?).await
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<Note> {
        let resp = self
            .http
            .post(&self.base)
            .json(&NewNote::new(title, content))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update(&self, id: &str, update: &NoteUpdate) -> Result<Note> {
        let resp = self.http.put(self.note_url(id)).json(update).send().await?;
        decode(resp).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let resp = self.http.delete(self.note_url(id)).send().await?;
        let _: serde_json::Value = decode(resp).await?;
        Ok(())
    }

    pub async fn summarize(&self, id: &str) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/summarize", self.note_url(id)))
            .send()
            .await?;
        let body: SummaryResponse = decode(resp).await?;
        Ok(body.summary)
    }
}

/// Decode a success body, or surface the server's `message` as the error.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.message)
        .unwrap_or(text);

    match status {
        StatusCode::NOT_FOUND => bail!("not found: {}", message),
        _ => bail!("server returned {}: {}", status, message),
    }
}

// ============ CLI entry points ============

pub async fn run_list(client: &NotesClient) -> Result<()> {
    let notes = client.list().await?;
    if notes.is_empty() {
        println!("No notes yet. Create one!");
        return Ok(());
    }

    for note in &notes {
        println!("{}  {}  {}", note.id, note.updated_at.format("%Y-%m-%d %H:%M"), note.title);
        if !note.summary.is_empty() {
            println!("    {}", first_line(&note.summary));
        }
    }
    println!("\n{} note(s)", notes.len());
    Ok(())
}

pub async fn run_get(client: &NotesClient, id: &str) -> Result<()> {
    let note = client.get(id).await?;
    print_note(&note);
    Ok(())
}

pub async fn run_create(client: &NotesClient, title: &str, content: &str) -> Result<()> {
    let note = client.create(title, content).await?;
    println!("Created note {}", note.id);
    Ok(())
}

pub async fn run_edit(
    client: &NotesClient,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<()> {
    if title.is_none() && content.is_none() {
        bail!("nothing to update: pass --title and/or --content");
    }
    let note = client.update(id, &NoteUpdate { title, content }).await?;
    println!("Updated note {}", note.id);
    Ok(())
}

pub async fn run_delete(client: &NotesClient, id: &str) -> Result<()> {
    client.delete(id).await?;
    println!("Deleted note {}", id);
    Ok(())
}

pub async fn run_summarize(client: &NotesClient, id: &str) -> Result<()> {
    let summary = client.summarize(id).await?;
    println!("--- AI Summary ---");
    println!("{}", summary);
    Ok(())
}

fn print_note(note: &Note) {
    println!("--- Note ---");
    println!("id:         {}", note.id);
    println!("title:      {}", note.title);
    println!("created_at: {}", note.created_at.to_rfc3339());
    println!("updated_at: {}", note.updated_at.to_rfc3339());
    println!();
    println!("--- Content ---");
    println!("{}", note.content);
    if !note.summary.is_empty() {
        println!();
        println!("--- Summary ---");
        println!("{}", note.summary);
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}
