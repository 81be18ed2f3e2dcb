//! Search backends and result normalization.
//!
//! Every backend answers one [`SearchRequest`] per selected source and hands
//! back [`Article`]s in the common shape. Upstream payloads are loose: any of
//! title, summary, URL or publish date may be missing, and [`normalize`]
//! fills the gaps.
//!
//! # Backends
//!
//! | Backend | Module | Transport |
//! |---------|--------|-----------|
//! | Tavily search API | [`tavily`] | `POST /search` |
//! | Backend proxy | [`proxy`] | `GET /api/news?sources=..&timeRange=..` |
//! | Offline | (none) | always fails, so the pipeline serves sample data |

pub mod proxy;
pub mod tavily;

use crate::error::{NewsError, Result};
use crate::models::{Article, PLACEHOLDER_URL};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::Html;

pub use proxy::ProxyClient;
pub use tavily::TavilyClient;

/// One query against one source.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub source_id: String,
    pub source_name: String,
    pub query: String,
    pub max_results: usize,
    pub window_days: u32,
}

/// A search result before normalization. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct RawHit {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub published: Option<String>,
}

/// Something that can answer a [`SearchRequest`].
pub trait SearchProvider {
    fn name(&self) -> &str;

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>>;
}

/// The backend chosen for a session.
#[derive(Debug)]
pub enum SearchBackend {
    Tavily(TavilyClient),
    Proxy(ProxyClient),
    /// No backend configured. Every search fails and the pipeline serves
    /// sample data.
    Offline,
}

impl SearchProvider for SearchBackend {
    fn name(&self) -> &str {
        match self {
            SearchBackend::Tavily(c) => c.name(),
            SearchBackend::Proxy(c) => c.name(),
            SearchBackend::Offline => "offline",
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Article>> {
        match self {
            SearchBackend::Tavily(c) => c.search(request).await,
            SearchBackend::Proxy(c) => c.search(request).await,
            SearchBackend::Offline => Err(NewsError::fetch(
                &request.source_id,
                "no search backend configured",
            )),
        }
    }
}

/// Turn a raw hit into an [`Article`].
///
/// Missing URL becomes the `#` placeholder, missing title and summary fall
/// back to the URL, and a missing or unparsable date stays unknown.
pub fn normalize(hit: RawHit, request: &SearchRequest, batch: i64, index: usize) -> Article {
    let url = non_empty(hit.url).unwrap_or_else(|| PLACEHOLDER_URL.to_string());
    let title = non_empty(hit.title.map(|t| strip_markup(&t))).unwrap_or_else(|| url.clone());
    let summary =
        non_empty(hit.summary.map(|s| strip_markup(&s))).unwrap_or_else(|| url.clone());
    let publish_time = hit.published.as_deref().and_then(parse_publish_time);

    Article {
        id: format!("{}_{}_{}", request.source_id, batch, index),
        title,
        summary,
        source: request.source_id.clone(),
        source_name: Some(request.source_name.clone()),
        url,
        publish_time,
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse the timestamp formats search backends actually send.
pub fn parse_publish_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Drop HTML tags and collapse whitespace. Plain text passes through.
pub fn strip_markup(s: &str) -> String {
    let text = if s.contains('<') {
        let fragment = Html::parse_fragment(s);
        fragment.root_element().text().collect::<Vec<_>>().join(" ")
    } else {
        s.to_string()
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn request() -> SearchRequest {
        SearchRequest {
            source_id: "autohome".to_string(),
            source_name: "汽车之家".to_string(),
            query: "site:autohome.com.cn/news 新车 上市".to_string(),
            max_results: 10,
            window_days: 1,
        }
    }

    #[test]
    fn test_normalize_full_hit() {
        let hit = RawHit {
            title: Some("比亚迪秦L正式上市".to_string()),
            summary: Some("<p>售价<b>7.98万</b>起</p>".to_string()),
            url: Some("https://www.autohome.com.cn/news/1.html".to_string()),
            published: Some("2025-05-06T08:00:00+08:00".to_string()),
        };
        let a = normalize(hit, &request(), 42, 3);
        assert_eq!(a.id, "autohome_42_3");
        assert_eq!(a.summary, "售价 7.98万 起");
        assert_eq!(a.source_name.as_deref(), Some("汽车之家"));
        assert_eq!(a.publish_time.unwrap().hour(), 0);
    }

    #[test]
    fn test_normalize_missing_fields_fall_back_to_url() {
        let hit = RawHit {
            url: Some("https://www.yiche.com/news/2.html".to_string()),
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let a = normalize(hit, &request(), 1, 0);
        assert_eq!(a.title, "https://www.yiche.com/news/2.html");
        assert_eq!(a.summary, "https://www.yiche.com/news/2.html");
        assert_eq!(a.publish_time, None);
    }

    #[test]
    fn test_normalize_empty_hit() {
        let a = normalize(RawHit::default(), &request(), 1, 0);
        assert_eq!(a.url, "#");
        assert_eq!(a.title, "#");
        assert!(!a.has_real_url());
    }

    #[test]
    fn test_parse_publish_time_formats() {
        assert!(parse_publish_time("2025-05-06T08:00:00Z").is_some());
        assert!(parse_publish_time("Tue, 06 May 2025 08:00:00 GMT").is_some());
        assert!(parse_publish_time("2025-05-06 08:00:00").is_some());
        let d = parse_publish_time("2025-05-06").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2025, 5, 6));
        assert_eq!(parse_publish_time("yesterday"), None);
        assert_eq!(parse_publish_time(""), None);
    }

    #[test]
    fn test_strip_markup_plain_text() {
        assert_eq!(strip_markup("  新车   上市 "), "新车 上市");
    }

    #[tokio::test]
    async fn test_offline_backend_fails_per_source() {
        let err = SearchBackend::Offline.search(&request()).await.unwrap_err();
        assert!(matches!(err, NewsError::FetchFailure { ref source_id, .. } if source_id == "autohome"));
    }
}
