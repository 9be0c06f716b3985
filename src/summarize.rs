//! Note summarization through an LLM chat-completions API.
//!
//! Defines the [`SummaryProvider`] trait and its implementations:
//! - **[`DisabledProvider`]**: used when `OPENAI_API_KEY` is not set; every
//!   call fails with [`NotesError::SummarizerUnavailable`].
//! - **[`OpenAIProvider`]**: calls `POST {api_base}/chat/completions`.
//!
//! [`summarize_note`] looks the note up, sends the fixed prompt built by
//! [`build_prompt`], and caches the result on the note.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, ... (capped at 2^5)

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::SummarizerConfig;
use crate::error::{NotesError, NotesResult};
use crate::store::NoteStore;

const MISSING_KEY_MESSAGE: &str = "OpenAI API key not configured.";

/// A backend able to turn a prompt into completion text.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Model identifier, `"disabled"` for [`DisabledProvider`].
    fn model_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> NotesResult<String>;
}

/// Build the summarization prompt for a note's content.
///
/// The content is embedded verbatim between the instructions and the
/// closing line asking for plain text.
pub fn build_prompt(content: &str) -> String {
    format!(
        "You are an assistant that summarizes notes.\n\n\
         Provide:\n\
         1) A one-line summary.\n\
         2) 3 bullet points of key ideas.\n\n\
         Note:\n{}\n\n\
         Return the summary as plain text.",
        content
    )
}

/// Summarize a stored note and cache the summary on it.
///
/// Looks the note up, sends [`build_prompt`] of its content to `provider`,
/// and writes the result back with [`NoteStore::set_summary`], which also
/// refreshes the note's `updated_at`.
///
/// # Arguments
///
/// * `store`: Note storage backend.
/// * `provider`: Completion backend ([`DisabledProvider`] or [`OpenAIProvider`]).
/// * `id`: ID of the note to summarize.
///
/// # Returns
///
/// The summary text, as stored on the note.
///
/// # Errors
///
/// - [`NotesError::NotFound`] if no note has this ID. This is checked before
///   the provider is called, so a missing API key never masks a 404.
/// - [`NotesError::SummarizerUnavailable`] if no API key is configured.
/// - [`NotesError::Summarizer`] if the API call fails after retries. The
///   note is left unchanged.
/// - [`NotesError::Storage`] on database failures.
pub async fn summarize_note(
    store: &dyn NoteStore,
    provider: &dyn SummaryProvider,
    id: &str,
) -> NotesResult<String> {
    let note = store.get(id).await?.ok_or(NotesError::NotFound)?;

    let prompt = build_prompt(&note.content);
    let summary = provider.complete(&prompt).await?;

    store
        .set_summary(id, &summary)
        .await?
        .ok_or(NotesError::NotFound)?;

    tracing::info!(id, model = provider.model_name(), chars = summary.len(), "cached note summary");
    Ok(summary)
}

// ============ Disabled Provider ============

pub struct DisabledProvider;

#[async_trait]
impl SummaryProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> NotesResult<String> {
        Err(NotesError::SummarizerUnavailable(
            MISSING_KEY_MESSAGE.to_string(),
        ))
    }
}

// ============ OpenAI Provider ============

/// Chat-completions client for OpenAI-compatible APIs.
///
/// Calls `POST {api_base}/chat/completions` with the configured model,
/// `max_tokens`, and `temperature`.
///
/// # Features
///
/// - Exponential backoff retry for rate limits and server errors
/// - Configurable timeout, max retries, and API base URL
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    config: SummarizerConfig,
}

impl OpenAIProvider {
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("OPENAI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let url = self.endpoint();
        let mut last_err = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(attempt, ?delay, "retrying summarization request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return Ok(parse_completion(&json));
                    }

                    // Rate limited or server error: retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Summarization failed after retries")))
    }
}

#[async_trait]
impl SummaryProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> NotesResult<String> {
        self.request(prompt).await.map_err(NotesError::Summarizer)
    }
}

/// Extract the completion text from a chat-completions response.
///
/// Prefers `choices[0].message.content`, falls back to the legacy
/// `choices[0].text`, and yields an empty string when neither is present.
pub fn parse_completion(json: &serde_json::Value) -> String {
    let choice = json.get("choices").and_then(|c| c.get(0));

    choice
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .or_else(|| choice.and_then(|c| c.get("text")).and_then(|t| t.as_str()))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Pick the provider for the current configuration.
///
/// # Supported Providers
///
/// | Condition | Provider |
/// |-----------|----------|
/// | `OPENAI_API_KEY` unset or blank | [`DisabledProvider`] (logs a warning) |
/// | key present | [`OpenAIProvider`] |
///
/// # Errors
///
/// Returns an error if the HTTP client for [`OpenAIProvider`] cannot be built.
pub fn create_provider(config: &SummarizerConfig) -> Result<Box<dyn SummaryProvider>> {
    if !config.is_enabled() {
        tracing::warn!(
            "OPENAI_API_KEY not set. Summarization endpoint will fail until a key is provided"
        );
        return Ok(Box::new(DisabledProvider));
    }
    Ok(Box::new(OpenAIProvider::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteDraft;
    use crate::store::InMemoryNoteStore;
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedProvider {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SummaryProvider for FixedProvider {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, prompt: &str) -> NotesResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_prompt_template() {
        let prompt = build_prompt("Buy milk");
        assert!(prompt.starts_with("You are an assistant that summarizes notes.\n\nProvide:\n"));
        assert!(prompt.contains("1) A one-line summary.\n2) 3 bullet points of key ideas."));
        assert!(prompt.contains("Note:\nBuy milk\n\n"));
        assert!(prompt.ends_with("Return the summary as plain text."));
    }

    #[test]
    fn test_parse_chat_message() {
        let json = json!({ "choices": [{ "message": { "content": "  hello  \n" } }] });
        assert_eq!(parse_completion(&json), "hello");
    }

    #[test]
    fn test_parse_legacy_text() {
        let json = json!({ "choices": [{ "text": " legacy " }] });
        assert_eq!(parse_completion(&json), "legacy");
    }

    #[test]
    fn test_parse_missing_fields() {
        assert_eq!(parse_completion(&json!({})), "");
        assert_eq!(parse_completion(&json!({ "choices": [] })), "");
    }

    #[test]
    fn test_create_provider_without_key() {
        let provider = create_provider(&SummarizerConfig::default()).unwrap();
        assert_eq!(provider.model_name(), "disabled");
    }

    #[test]
    fn test_create_provider_with_key() {
        let config = SummarizerConfig {
            api_key: Some("sk-test".to_string()),
            ..SummarizerConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_summarize_caches_result() {
        let store = InMemoryNoteStore::new();
        let note = store
            .insert(NoteDraft {
                title: "t".into(),
                content: "the content".into(),
            })
            .await
            .unwrap();
        let provider = FixedProvider::new("short summary");

        let summary = summarize_note(&store, &provider, &note.id).await.unwrap();
        assert_eq!(summary, "short summary");

        let stored = store.get(&note.id).await.unwrap().unwrap();
        assert_eq!(stored.summary, "short summary");
        assert!(provider.prompts.lock().unwrap()[0].contains("the content"));
    }

    #[tokio::test]
    async fn test_missing_note_checked_before_provider() {
        let store = InMemoryNoteStore::new();
        let err = summarize_note(&store, &DisabledProvider, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::NotFound));
    }

    #[tokio::test]
    async fn test_disabled_provider_leaves_note_untouched() {
        let store = InMemoryNoteStore::new();
        let note = store
            .insert(NoteDraft {
                title: "t".into(),
                content: "c".into(),
            })
            .await
            .unwrap();

        let err = summarize_note(&store, &DisabledProvider, &note.id)
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::SummarizerUnavailable(ref m) if m == MISSING_KEY_MESSAGE));
        assert_eq!(store.get(&note.id).await.unwrap().unwrap(), note);
    }
}
