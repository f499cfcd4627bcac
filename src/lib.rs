//! procdesk - defect and recruitment desk
//!
//! Library behind the procdesk CLI: two record kinds with embedded task
//! lists, an in-memory store per kind, a draft editor, and a best-effort
//! client for a generative text service.
//!
//! # Core Concepts
//!
//! - **Records**: customer defects and hiring candidates
//! - **Tasks**: follow-up work owned by a record
//! - **Drafts**: working copies that are committed or discarded
//! - **Suggestions**: AI categories, tasks and documents with safe fallbacks
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.procdesk.toml`
//! - `editor`: Drafts, commit/discard and suggestion merging
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output envelopes
//! - `record`: Defect and candidate types
//! - `seed`: Sample records loaded at startup
//! - `store`: In-memory record store and id allocation
//! - `suggest`: Suggestion client and the Gemini backend
//! - `task`: Task type and task list helpers

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod output;
pub mod record;
pub mod seed;
pub mod store;
pub mod suggest;
pub mod task;

pub use error::{Error, Result};
