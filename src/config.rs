//! TOML configuration with environment overrides.
//!
//! The API key is only ever taken from `OPENAI_API_KEY`; it is not read from
//! the file. `PORT` and `AI_MODEL` override the corresponding file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            api_base: default_api_base(),
            api_key: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    300
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl SummarizerConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Read and validate the config file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Environment lookups go through `lookup` so tests don't touch process env.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // An empty PORT counts as unset.
    if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        config.server.bind = replace_port(&config.server.bind, port);
    }

    if let Some(model) = lookup("AI_MODEL").filter(|m| !m.trim().is_empty()) {
        config.summarizer.model = model;
    }

    config.summarizer.api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

    Ok(())
}

fn replace_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{}:{}", host, port),
        None => format!("{}:{}", bind, port),
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.summarizer.max_tokens == 0 {
        anyhow::bail!("summarizer.max_tokens must be > 0");
    }

    if !(0.0..=2.0).contains(&config.summarizer.temperature) {
        anyhow::bail!("summarizer.temperature must be in [0.0, 2.0]");
    }

    if config.summarizer.api_base.trim().is_empty() {
        anyhow::bail!("summarizer.api_base must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    const MINIMAL: &str = r#"
[db]
path = "./data/notes.sqlite"

[server]
bind = "127.0.0.1:5000"
"#;

    #[test]
    fn test_defaults() {
        let cfg = parse(MINIMAL);
        assert_eq!(cfg.summarizer.model, "gpt-4o-mini");
        assert_eq!(cfg.summarizer.max_tokens, 300);
        assert!((cfg.summarizer.temperature - 0.2).abs() < f32::EPSILON);
        assert!(!cfg.summarizer.is_enabled());
        validate(&cfg).unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = parse(MINIMAL);
        let env: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("AI_MODEL", "gpt-4o"),
            ("OPENAI_API_KEY", "sk-test"),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert_eq!(cfg.summarizer.model, "gpt-4o");
        assert!(cfg.summarizer.is_enabled());
    }

    #[test]
    fn test_blank_api_key_is_disabled() {
        let mut cfg = parse(MINIMAL);
        apply_env_overrides(&mut cfg, |k| {
            (k == "OPENAI_API_KEY").then(|| "   ".to_string())
        })
        .unwrap();
        assert!(!cfg.summarizer.is_enabled());
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut cfg = parse(MINIMAL);
        let err = apply_env_overrides(&mut cfg, |k| (k == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_empty_port_ignored() {
        let mut cfg = parse(MINIMAL);
        apply_env_overrides(&mut cfg, |k| (k == "PORT").then(String::new)).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");

        apply_env_overrides(&mut cfg, |k| (k == "PORT").then(|| "  ".to_string())).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
    }

    #[test]
    fn test_invalid_temperature() {
        let cfg = parse(&format!("{}\n[summarizer]\ntemperature = 3.5\n", MINIMAL));
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_zero_max_tokens() {
        let cfg = parse(&format!("{}\n[summarizer]\nmax_tokens = 0\n", MINIMAL));
        assert!(validate(&cfg).is_err());
    }
}
