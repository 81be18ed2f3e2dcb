//! Error taxonomy shared by the pipeline, storage and rewrite layers.
//!
//! Most variants never reach the end user: fetch and rewrite failures are
//! absorbed by the fallbacks in [`crate::pipeline`] and [`crate::rewrite`].
//! Only [`NewsError::NoSourceSelected`] (strict mode) and the storage/input
//! errors are surfaced to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    /// Strict mode only: the caller asked for a fetch with an empty selection.
    #[error("请至少选择一个新闻源 (no news source selected)")]
    NoSourceSelected,

    /// A single source's query failed. Isolated per source.
    #[error("fetch failed for source {source_id}: {reason}")]
    FetchFailure { source_id: String, reason: String },

    /// The rewrite service answered and refused, or answered garbage. Final.
    #[error("rewrite failed: {0}")]
    RewriteFailure(String),

    /// The rewrite service could not be reached or returned an error status.
    /// Worth another attempt.
    #[error("rewrite service unavailable: {0}")]
    RewriteUnavailable(String),

    /// The quality filter removed every candidate. Internal signal for widening.
    #[error("quality filter removed every candidate")]
    EmptySelectionAfterFilter,

    #[error("没有可重新生成的内容 (nothing to regenerate)")]
    NothingToRegenerate,

    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// The requested position is not in the last fetched batch.
    #[error("no article #{0} in the last fetch; run `fetch` first")]
    ArticleNotFound(usize),

    #[error("history record not found: {0}")]
    HistoryNotFound(i64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NewsError>;

impl NewsError {
    /// Shorthand used by the search backends.
    pub fn fetch(source_id: impl Into<String>, reason: impl ToString) -> Self {
        NewsError::FetchFailure {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }

    /// True when another attempt at the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, NewsError::RewriteUnavailable(_) | NewsError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_message() {
        let e = NewsError::fetch("autohome", "timed out after 10s");
        assert_eq!(
            e.to_string(),
            "fetch failed for source autohome: timed out after 10s"
        );
        assert!(!e.is_transient());
    }

    #[test]
    fn test_only_unavailability_is_transient() {
        assert!(NewsError::RewriteUnavailable("HTTP 503".to_string()).is_transient());
        assert!(!NewsError::RewriteFailure("HTTP 代理配置错误".to_string()).is_transient());
        assert!(!NewsError::NoSourceSelected.is_transient());
    }
}
