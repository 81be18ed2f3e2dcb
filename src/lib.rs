//! # Auto News Desk
//!
//! Fetches automotive industry news from a set of selectable sources, keeps
//! only market-relevant, fresh, never-before-seen articles, and rewrites one
//! of them into short or long copy in a chosen voice.
//!
//! ## Architecture
//!
//! 1. **Sources**: [`sources::SourceRegistry`] and [`sources::SelectionSet`]
//! 2. **Search**: one query per selected source through a [`search::SearchProvider`]
//! 3. **Pipeline**: [`pipeline::NewsPipeline`] filters, deduplicates, applies
//!    the time window, excludes seen articles, ranks and caps
//! 4. **Rewrite**: [`rewrite::Rewriter`] with a local template fallback
//! 5. **Persistence**: [`storage::Storage`] over a string key-value store

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod rewrite;
pub mod search;
pub mod sources;
pub mod storage;
pub mod utils;

pub use error::{NewsError, Result};
