//! Data models for sources, articles, rewrite records and settings.
//!
//! Field names serialize in camelCase (`publishTime`, `isCustom`,
//! `originalNews`) so the stored JSON and the proxy/rewrite wire shapes stay
//! interchangeable with the browser build.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Placeholder URL used by sources that give no link (and by sample data).
pub const PLACEHOLDER_URL: &str = "#";

/// A named origin of news articles, built-in or user-added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

impl Source {
    /// Host of the source URL without a leading `www.`
    /// For example: "https://www.autohome.com.cn" -> "autohome.com.cn"
    pub fn host(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        Some(host.trim_start_matches("www.").to_string())
    }
}

/// A single normalized news item.
///
/// `publish_time` is `None` when the upstream gave no usable timestamp; the
/// recency filter treats that as unknown rather than inventing a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,
}

impl Article {
    /// Whether the URL identifies the article (not empty, not `#`).
    pub fn has_real_url(&self) -> bool {
        is_real_url(&self.url)
    }

    /// Identity used for deduplication: the URL when real, else the title.
    pub fn identity_key(&self) -> &str {
        if self.has_real_url() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Lowercased `title summary url`, the text the quality filter inspects.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.url).to_lowercase()
    }

    /// Free text searched for dates when `publish_time` is unknown.
    pub fn date_text(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.url)
    }
}

pub fn is_real_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url != PLACEHOLDER_URL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 短文案: 100-300 characters, for social feeds
    #[default]
    Short,
    /// 长文章: 500-1500 characters, for blogs and public accounts
    Long,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Short => "short",
            OutputFormat::Long => "long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    /// vlog风: lively, spoken
    #[default]
    Vlog,
    /// 专业评测风: data-driven, reviewer tone
    Review,
    /// 种草安利风: enthusiastic recommendation
    Push,
    /// 新闻报道风: concise and neutral
    News,
}

impl WritingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            WritingStyle::Vlog => "vlog",
            WritingStyle::Review => "review",
            WritingStyle::Push => "push",
            WritingStyle::News => "news",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User settings persisted under a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub default_format: OutputFormat,
    pub default_style: WritingStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            default_format: OutputFormat::Short,
            default_style: WritingStyle::Vlog,
        }
    }
}

/// Partial settings update; `None` fields keep the stored value.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub default_format: Option<OutputFormat>,
    pub default_style: Option<WritingStyle>,
}

impl Settings {
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(format) = patch.default_format {
            self.default_format = format;
        }
        if let Some(style) = patch.default_style {
            self.default_style = style;
        }
        self
    }
}

/// A successful rewrite, kept in the capped rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRecord {
    pub id: i64,
    pub original_news: Article,
    pub result: String,
    pub format: OutputFormat,
    pub style: WritingStyle,
    pub timestamp: DateTime<Utc>,
}
