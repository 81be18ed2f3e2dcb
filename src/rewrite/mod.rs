//! Article rewriting.
//!
//! [`Rewriter`] sends one article to a [`RewriteProvider`] and, when that
//! fails for any reason, answers from the local [`templates`] instead. A
//! rewrite therefore always produces text; the provider error is only logged.
//!
//! The rewriter remembers the last article, format and style so the same
//! request can be replayed with [`Rewriter::regenerate`].

pub mod remote;
pub mod templates;

use crate::api::RetryRewrite;
use crate::error::{NewsError, Result};
use crate::models::{Article, OutputFormat, RewriteRecord, WritingStyle};
use serde::Serialize;
use tracing::{info, instrument, warn};

pub use remote::RemoteRewriter;

/// Body of one rewrite call.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteRequest {
    pub news: Article,
    pub format: OutputFormat,
    pub style: WritingStyle,
    /// Ask the service for its slower, deeper model.
    pub deep: bool,
}

/// Something that turns a [`RewriteRequest`] into text.
pub trait RewriteProvider {
    fn name(&self) -> &str;

    async fn rewrite(&self, request: &RewriteRequest) -> Result<String>;
}

/// Provider that always fails, leaving every rewrite to the local templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnly;

impl RewriteProvider for LocalOnly {
    fn name(&self) -> &str {
        "local"
    }

    async fn rewrite(&self, _request: &RewriteRequest) -> Result<String> {
        Err(NewsError::RewriteFailure(
            "no rewrite service configured".to_string(),
        ))
    }
}

/// The provider chosen for a session.
#[derive(Debug)]
pub enum RewriteBackend {
    Remote(RetryRewrite<RemoteRewriter>),
    Local(LocalOnly),
}

impl RewriteProvider for RewriteBackend {
    fn name(&self) -> &str {
        match self {
            RewriteBackend::Remote(r) => r.name(),
            RewriteBackend::Local(l) => l.name(),
        }
    }

    async fn rewrite(&self, request: &RewriteRequest) -> Result<String> {
        match self {
            RewriteBackend::Remote(r) => r.rewrite(request).await,
            RewriteBackend::Local(l) => l.rewrite(request).await,
        }
    }
}

/// Where a rewrite's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteSource {
    Remote,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub source: RewriteSource,
}

#[derive(Debug)]
pub struct Rewriter<P> {
    provider: P,
    deep: bool,
    last: Option<RewriteRequest>,
    current: Option<String>,
}

impl<P: RewriteProvider> Rewriter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            deep: false,
            last: None,
            current: None,
        }
    }

    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// Rewrite `news`. Never fails: provider errors fall back to templates.
    #[instrument(level = "info", skip_all, fields(
        provider = self.provider.name(),
        news_id = %news.id,
        format = format.as_str(),
        style = style.as_str()
    ))]
    pub async fn rewrite(
        &mut self,
        news: &Article,
        format: OutputFormat,
        style: WritingStyle,
    ) -> RewriteOutcome {
        let request = RewriteRequest {
            news: news.clone(),
            format,
            style,
            deep: self.deep,
        };
        let outcome = match self.provider.rewrite(&request).await {
            Ok(text) => RewriteOutcome {
                text,
                source: RewriteSource::Remote,
            },
            Err(e) => {
                warn!(error = %e, "Rewrite service failed; using local template");
                RewriteOutcome {
                    text: templates::render(news, format, style),
                    source: RewriteSource::Template,
                }
            }
        };
        info!(source = ?outcome.source, chars = outcome.text.chars().count(), "Rewrite ready");
        self.last = Some(request);
        self.current = Some(outcome.text.clone());
        outcome
    }

    /// Seed the rewriter from a stored record, as if that rewrite had just
    /// happened in this session.
    pub fn restore(&mut self, record: &RewriteRecord) {
        self.last = Some(RewriteRequest {
            news: record.original_news.clone(),
            format: record.format,
            style: record.style,
            deep: self.deep,
        });
        self.current = Some(record.result.clone());
    }

    /// Replay the last rewrite with the same article, format and style.
    pub async fn regenerate(&mut self) -> Result<RewriteOutcome> {
        let last = self.last.clone().ok_or(NewsError::NothingToRegenerate)?;
        Ok(self.rewrite(&last.news, last.format, last.style).await)
    }

    /// Text of the latest rewrite, if any.
    pub fn current_result(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn last_request(&self) -> Option<&RewriteRequest> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Scripted {
        answers: Mutex<Vec<Result<String>>>,
    }

    impl RewriteProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn rewrite(&self, _request: &RewriteRequest) -> Result<String> {
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(NewsError::RewriteFailure("exhausted".to_string())))
        }
    }

    fn article() -> Article {
        Article {
            id: "yiche_1".to_string(),
            title: "极氪001全新改款".to_string(),
            summary: "续航达1000km".to_string(),
            source: "yiche".to_string(),
            source_name: None,
            url: "#".to_string(),
            publish_time: None,
        }
    }

    #[tokio::test]
    async fn test_remote_text_is_used() {
        let provider = Scripted {
            answers: Mutex::new(vec![Ok("远端文案".to_string())]),
        };
        let mut rewriter = Rewriter::new(provider);
        let out = rewriter
            .rewrite(&article(), OutputFormat::Short, WritingStyle::News)
            .await;
        assert_eq!(out.source, RewriteSource::Remote);
        assert_eq!(rewriter.current_result(), Some("远端文案"));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_template() {
        let mut rewriter = Rewriter::new(LocalOnly);
        let out = rewriter
            .rewrite(&article(), OutputFormat::Short, WritingStyle::Review)
            .await;
        assert_eq!(out.source, RewriteSource::Template);
        assert!(out.text.starts_with("【新车快讯】极氪001全新改款"));
    }

    #[tokio::test]
    async fn test_service_refusal_falls_back_to_local_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/rewrite")
            .with_status(200)
            .with_body(r#"{"success": false, "error": "quota"}"#)
            .create_async()
            .await;

        let mut rewriter = Rewriter::new(RemoteRewriter::new(server.url(), Duration::from_secs(5)));
        let out = rewriter
            .rewrite(&article(), OutputFormat::Long, WritingStyle::Vlog)
            .await;
        assert_eq!(out.source, RewriteSource::Template);
        assert!(!out.text.is_empty());
        assert!(out.text.contains("极氪001全新改款"));
    }

    #[tokio::test]
    async fn test_regenerate_without_history() {
        let mut rewriter = Rewriter::new(LocalOnly);
        assert!(matches!(
            rewriter.regenerate().await,
            Err(NewsError::NothingToRegenerate)
        ));
        assert_eq!(rewriter.current_result(), None);
    }

    #[tokio::test]
    async fn test_restore_enables_regenerate() {
        let record = RewriteRecord {
            id: 7,
            original_news: article(),
            result: "旧文案".to_string(),
            format: OutputFormat::Short,
            style: WritingStyle::News,
            timestamp: chrono::Utc::now(),
        };
        let mut rewriter = Rewriter::new(RewriteBackend::Local(LocalOnly));
        rewriter.restore(&record);
        assert_eq!(rewriter.current_result(), Some("旧文案"));
        let again = rewriter.regenerate().await.unwrap();
        assert!(again.text.starts_with("【汽车资讯】极氪001全新改款"));
    }

    #[tokio::test]
    async fn test_regenerate_replays_last_request() {
        let provider = Scripted {
            answers: Mutex::new(vec![Ok("第二版".to_string()), Ok("第一版".to_string())]),
        };
        let mut rewriter = Rewriter::new(provider).with_deep(true);
        rewriter
            .rewrite(&article(), OutputFormat::Long, WritingStyle::Push)
            .await;
        let again = rewriter.regenerate().await.unwrap();
        assert_eq!(again.text, "第二版");
        let last = rewriter.last_request().unwrap();
        assert_eq!(last.format, OutputFormat::Long);
        assert_eq!(last.style, WritingStyle::Push);
        assert!(last.deep);
    }
}
