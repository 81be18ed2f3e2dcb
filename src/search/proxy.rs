//! Backend proxy search.
//!
//! The proxy takes source ids instead of free-text queries and wraps its
//! answer in `{success, data, error}`. `success: false` counts as a fetch
//! failure for that source.

use super::{RawHit, SearchProvider, SearchRequest, normalize};
use crate::error::{NewsError, Result};
use crate::models::Article;
use crate::utils::truncate_for_log;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<ProxyArticle>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyArticle {
    title: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    #[serde(alias = "published_date")]
    publish_time: Option<String>,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

impl SearchProvider for ProxyClient {
    fn name(&self) -> &str {
        "proxy"
    }

    #[instrument(level = "info", skip_all, fields(source = %request.source_id))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>> {
        let days = request.window_days.to_string();
        let response = self
            .http
            .get(format!("{}/api/news", self.base_url))
            .query(&[("sources", request.source_id.as_str()), ("timeRange", days.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| NewsError::fetch(&request.source_id, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NewsError::fetch(&request.source_id, e))?;

        // the proxy reports its own failures in the envelope, even on 4xx/5xx
        let envelope: ProxyEnvelope = serde_json::from_str(&text).map_err(|e| {
            warn!(%status, body = %truncate_for_log(&text, 300), "Unparsable proxy payload");
            NewsError::fetch(&request.source_id, format!("malformed payload: {e}"))
        })?;

        if !envelope.success || !status.is_success() {
            let reason = envelope
                .error
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(NewsError::fetch(&request.source_id, reason));
        }

        let batch = Utc::now().timestamp_millis();
        let articles: Vec<Article> = envelope
            .data
            .into_iter()
            .take(request.max_results)
            .enumerate()
            .map(|(i, a)| {
                let hit = RawHit {
                    title: a.title,
                    summary: a.summary,
                    url: a.url,
                    published: a.publish_time,
                };
                normalize(hit, request, batch, i)
            })
            .collect();

        info!(count = articles.len(), "Proxy search finished");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn request() -> SearchRequest {
        SearchRequest {
            source_id: "dongche".to_string(),
            source_name: "懂车帝".to_string(),
            query: String::new(),
            max_results: 10,
            window_days: 3,
        }
    }

    #[tokio::test]
    async fn test_proxy_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/news")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sources".into(), "dongche".into()),
                Matcher::UrlEncoded("timeRange".into(), "3".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"success": true, "count": 1, "data": [
                    {"id": "x", "title": "小米SU7订单突破10万", "summary": "交付", "url": "https://www.dongchedi.com/article/1", "source": "dongche", "publishTime": "2025-05-06T08:00:00"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = ProxyClient::new(format!("{}/", server.url()), Duration::from_secs(5));
        let articles = client.search(&request()).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "dongche");
        assert!(articles[0].publish_time.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_proxy_envelope_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/news")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"success": false, "error": "请选择新闻源"}"#)
            .create_async()
            .await;

        let client = ProxyClient::new(server.url(), Duration::from_secs(5));
        let err = client.search(&request()).await.unwrap_err();
        assert!(err.to_string().contains("请选择新闻源"));
    }
}
