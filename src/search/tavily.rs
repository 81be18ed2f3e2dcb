//! [Tavily](https://tavily.com) search API backend.
//!
//! One `POST {base}/search` per source, using the source's keyword template
//! as the query. Results carry `title`, `content`, `url` and sometimes
//! `published_date`; everything else in the payload is ignored.

use super::{RawHit, SearchProvider, SearchRequest, normalize};
use crate::error::{NewsError, Result};
use crate::models::Article;
use crate::utils::truncate_for_log;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Clone)]
pub struct TavilyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct TavilyQuery<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_date: Option<String>,
}

impl From<TavilyResult> for RawHit {
    fn from(r: TavilyResult) -> Self {
        RawHit {
            title: r.title,
            summary: r.content,
            url: r.url,
            published: r.published_date,
        }
    }
}

impl TavilyClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

impl SearchProvider for TavilyClient {
    fn name(&self) -> &str {
        "tavily"
    }

    #[instrument(level = "info", skip_all, fields(source = %request.source_id))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>> {
        let t0 = Instant::now();
        let body = TavilyQuery {
            api_key: &self.api_key,
            query: &request.query,
            max_results: request.max_results,
            include_answer: true,
            include_images: false,
        };

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| NewsError::fetch(&request.source_id, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NewsError::fetch(&request.source_id, e))?;
        if !status.is_success() {
            warn!(%status, body = %truncate_for_log(&text, 300), "Tavily returned an error status");
            return Err(NewsError::fetch(
                &request.source_id,
                format!("HTTP {status}"),
            ));
        }

        let parsed: TavilyResponse = serde_json::from_str(&text).map_err(|e| {
            debug!(body = %truncate_for_log(&text, 300), "Unparsable Tavily payload");
            NewsError::fetch(&request.source_id, format!("malformed payload: {e}"))
        })?;

        let batch = Utc::now().timestamp_millis();
        let articles: Vec<Article> = parsed
            .results
            .into_iter()
            .enumerate()
            .map(|(i, r)| normalize(r.into(), request, batch, i))
            .collect();

        info!(
            count = articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Tavily search finished"
        );
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn request() -> SearchRequest {
        SearchRequest {
            source_id: "yiche".to_string(),
            source_name: "易车".to_string(),
            query: "site:yiche.com 新车 上市".to_string(),
            max_results: 10,
            window_days: 1,
        }
    }

    #[tokio::test]
    async fn test_search_normalizes_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "api_key": "test-key",
                "query": "site:yiche.com 新车 上市",
                "max_results": 10
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "answer": "ignored",
                    "results": [
                        {"title": "极氪001全新改款 续航达1000km", "content": "极氪官方发布", "url": "https://www.yiche.com/news/1.html", "published_date": "2025-05-06T08:00:00Z"},
                        {"url": "https://www.yiche.com/news/2.html"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = TavilyClient::new(server.url(), "test-key", Duration::from_secs(5));
        let articles = client.search(&request()).await.unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "极氪001全新改款 续航达1000km");
        assert!(articles[0].publish_time.is_some());
        assert_eq!(articles[1].title, "https://www.yiche.com/news/2.html");
        assert_eq!(articles[1].publish_time, None);
        assert!(articles.iter().all(|a| a.source == "yiche"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(401)
            .with_body(r#"{"detail":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = TavilyClient::new(server.url(), "bad", Duration::from_secs(5));
        let err = client.search(&request()).await.unwrap_err();
        assert!(matches!(err, NewsError::FetchFailure { .. }));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = TavilyClient::new(server.url(), "k", Duration::from_secs(5));
        let err = client.search(&request()).await.unwrap_err();
        assert!(err.to_string().contains("malformed payload"));
    }
}
