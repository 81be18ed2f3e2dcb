//! Remote rewrite service client.
//!
//! `POST {base}/api/rewrite` with `{news, format, style, deep}`; the service
//! answers `{success, data?, error?}`. Transport errors and error statuses
//! come back as [`NewsError::RewriteUnavailable`]; everything the service
//! says on purpose is a [`NewsError::RewriteFailure`].

use super::{RewriteProvider, RewriteRequest};
use crate::error::{NewsError, Result};
use crate::utils::truncate_for_log;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct RemoteRewriter {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RewriteEnvelope {
    success: bool,
    data: Option<String>,
    error: Option<String>,
}

impl RemoteRewriter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/rewrite", self.base_url)
    }
}

impl RewriteProvider for RemoteRewriter {
    fn name(&self) -> &str {
        "remote"
    }

    #[instrument(level = "info", skip_all, fields(
        news_id = %request.news.id,
        format = request.format.as_str(),
        style = request.style.as_str()
    ))]
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint())
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| NewsError::RewriteUnavailable(format!("transport: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::RewriteUnavailable(format!("HTTP {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| NewsError::RewriteUnavailable(format!("transport: {e}")))?;
        let envelope: RewriteEnvelope = serde_json::from_str(&text).map_err(|e| {
            warn!(body = %truncate_for_log(&text, 300), "Unparsable rewrite payload");
            NewsError::RewriteFailure(format!("malformed payload: {e}"))
        })?;

        if !envelope.success {
            return Err(NewsError::RewriteFailure(
                envelope.error.unwrap_or_else(|| "改写失败".to_string()),
            ));
        }
        match envelope.data {
            Some(data) if !data.trim().is_empty() => {
                info!(chars = data.chars().count(), "Remote rewrite finished");
                Ok(data)
            }
            _ => Err(NewsError::RewriteFailure("empty result".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, OutputFormat, WritingStyle};
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> RewriteRequest {
        RewriteRequest {
            news: Article {
                id: "autohome_1".to_string(),
                title: "问界M9大定超5万".to_string(),
                summary: "华为鸿蒙座舱成亮点".to_string(),
                source: "autohome".to_string(),
                source_name: None,
                url: "https://www.autohome.com.cn/news/1.html".to_string(),
                publish_time: None,
            },
            format: OutputFormat::Long,
            style: WritingStyle::Review,
            deep: true,
        }
    }

    #[tokio::test]
    async fn test_success_returns_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/rewrite")
            .match_body(Matcher::PartialJson(json!({
                "format": "long",
                "style": "review",
                "deep": true,
                "news": {"title": "问界M9大定超5万"}
            })))
            .with_status(200)
            .with_body(r#"{"success": true, "data": "专业解读：问界M9"}"#)
            .create_async()
            .await;

        let client = RemoteRewriter::new(server.url(), Duration::from_secs(5));
        assert_eq!(client.rewrite(&request()).await.unwrap(), "专业解读：问界M9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_service_refusal_carries_reason() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/rewrite")
            .with_status(200)
            .with_body(r#"{"success": false, "error": "新闻内容不能为空"}"#)
            .create_async()
            .await;

        let client = RemoteRewriter::new(server.url(), Duration::from_secs(5));
        match client.rewrite(&request()).await {
            Err(NewsError::RewriteFailure(reason)) => assert_eq!(reason, "新闻内容不能为空"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/rewrite")
            .with_status(500)
            .with_body(r#"{"success": false, "error": "boom"}"#)
            .create_async()
            .await;

        let client = RemoteRewriter::new(server.url(), Duration::from_secs(5));
        match client.rewrite(&request()).await {
            Err(NewsError::RewriteUnavailable(reason)) => assert!(reason.starts_with("HTTP 500")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
