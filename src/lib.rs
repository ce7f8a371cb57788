//! # tasktalk
//!
//! Personal todo service with a natural-language command interpreter.
//!
//! This library provides:
//! - HTTP APIs for todo CRUD and a chat endpoint
//! - A rule-based interpreter that turns free text into structured commands
//! - A hosted-model fallback for requests the rules cannot interpret
//!
//! ## Request Flow (chat)
//!
//! ```text
//!   message ──► rule cascade ──► Command ──► TaskStore
//!                    │              ▲
//!                    ▼              │
//!              remote fallback ─────┘
//! ```
//!
//! ## Modules
//! - `assistant`: intent classification, entity extraction, reference resolution
//! - `task`: Todo records, priorities, filters and snapshots
//! - `llm`: Hosted model client (OpenRouter)
//! - `api`: HTTP surface and task storage backends

pub mod api;
pub mod assistant;
pub mod config;
pub mod llm;
pub mod task;

pub use assistant::{Assistant, Command};
pub use config::Config;
