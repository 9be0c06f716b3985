//! # notekeeper
//!
//! A small notes service: CRUD over notes stored in SQLite, plus an endpoint
//! that asks an LLM for a summary of a note and caches it on the note.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────┐
//! │  client  │──▶│  server  │──▶│ notes /     │──▶│  store   │
//! │  (CLI)   │   │  (axum)  │   │ summarize   │   │ (SQLite) │
//! └──────────┘   └──────────┘   └──────┬──────┘   └──────────┘
//!                                      ▼
//!                               ┌─────────────┐
//!                               │ OpenAI chat │
//!                               │ completions │
//!                               └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! notes init                          # create database
//! OPENAI_API_KEY=sk-... notes serve   # start HTTP server
//! notes create --title "Ideas" --content "..."
//! notes summarize <id>
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`models`] | Note data types |
//! | [`store`] | Storage trait with SQLite and in-memory backends |
//! | [`notes`] | Validated CRUD operations |
//! | [`summarize`] | LLM summarization and caching |
//! | [`server`] | HTTP API |
//! | [`client`] | HTTP client used by the CLI |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod models;
pub mod notes;
pub mod server;
pub mod store;
pub mod summarize;
