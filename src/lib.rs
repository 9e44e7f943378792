//! mail-assist — command-line email triage over JMAP with local LLM summaries.

pub mod assistant;
pub mod config;
pub mod content;
pub mod error;
pub mod jmap;
pub mod session;
