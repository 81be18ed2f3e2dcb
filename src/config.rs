//! Static catalogs and tunables: built-in sources, query templates, keyword
//! policy, style/format metadata and pipeline limits.

use crate::models::{OutputFormat, Source, WritingStyle};
use std::time::Duration;

/// Pseudo-source used when the selection is empty.
pub const ALL_SOURCES_ID: &str = "all";

/// Final number of articles surfaced by one fetch.
pub const MAX_SURFACED: usize = 5;
/// Seen-URL ledger capacity.
pub const SEEN_LEDGER_CAPACITY: usize = 100;
/// Rewrite history capacity.
pub const REWRITE_HISTORY_CAPACITY: usize = 50;
/// `max_results` sent to the search backend per query.
pub const SEARCH_MAX_RESULTS: usize = 10;
/// Selection used when nothing was persisted yet.
pub const DEFAULT_SELECTION: &[&str] = &["autohome", "dongche", "yiche"];
/// Windows offered to the user, in days.
pub const TIME_RANGES: &[(u32, &str)] = &[(1, "今天"), (3, "3天内"), (7, "7天内")];

struct BuiltinSource {
    id: &'static str,
    name: &'static str,
    url: &'static str,
    icon: &'static str,
    category: &'static str,
    keyword: &'static str,
}

const BUILTIN_SOURCES: &[BuiltinSource] = &[
    BuiltinSource {
        id: "autohome",
        name: "汽车之家",
        url: "https://www.autohome.com.cn",
        icon: "🚗",
        category: "权威汽车媒体",
        keyword: "site:autohome.com.cn/news 新车 上市",
    },
    BuiltinSource {
        id: "yiche",
        name: "易车",
        url: "https://www.yiche.com",
        icon: "🚙",
        category: "汽车垂直平台",
        keyword: "site:yiche.com 新车 上市",
    },
    BuiltinSource {
        id: "dongche",
        name: "懂车帝",
        url: "https://www.dongchedi.com",
        icon: "🏎️",
        category: "字节跳动汽车",
        keyword: "site:dongchedi.com 新车 上市",
    },
    BuiltinSource {
        id: "pcauto",
        name: "太平洋汽车",
        url: "https://www.pcauto.com.cn",
        icon: "🚘",
        category: "汽车门户",
        keyword: "site:pcauto.com.cn 新车 上市",
    },
    BuiltinSource {
        id: "sina",
        name: "新浪汽车",
        url: "https://auto.sina.com.cn",
        icon: "🚔",
        category: "综合汽车媒体",
        keyword: "site:auto.sina.com.cn 新车 上市",
    },
    BuiltinSource {
        id: "weibo",
        name: "微博汽车",
        url: "https://weibo.com",
        icon: "📱",
        category: "微博热榜",
        keyword: "site:weibo.com 汽车热榜 新车",
    },
    BuiltinSource {
        id: ALL_SOURCES_ID,
        name: "全网",
        url: "https://www.baidu.com",
        icon: "🌐",
        category: "全网搜索",
        keyword: "汽车 新车 上市 政策 行业",
    },
];

/// Built-in sources in display order.
pub fn builtin_sources() -> Vec<Source> {
    BUILTIN_SOURCES
        .iter()
        .map(|b| Source {
            id: b.id.to_string(),
            name: b.name.to_string(),
            url: b.url.to_string(),
            icon: Some(b.icon.to_string()),
            category: Some(b.category.to_string()),
            is_custom: false,
        })
        .collect()
}

/// Query template for a built-in source id.
pub fn builtin_keyword(source_id: &str) -> Option<&'static str> {
    BUILTIN_SOURCES
        .iter()
        .find(|b| b.id == source_id)
        .map(|b| b.keyword)
}

/// Query used for the `all` pseudo-source and for ids nobody knows.
pub fn all_sources_keyword() -> &'static str {
    builtin_keyword(ALL_SOURCES_ID).unwrap_or("汽车 新车 上市")
}

/// Market-moving terms; an article needs at least one of these.
pub const INCLUDE_KEYWORDS: &[&str] = &[
    "新车", "上市", "发布", "预售", "亮相", "首发",
    "政策", "补贴", "法规", "标准", "规划",
    "行业", "销量", "交付", "财报", "投资", "合作",
    "新能源", "电动车", "智驾", "电池", "续航",
    "比亚迪", "特斯拉", "小米", "华为", "吉利", "长城", "长安", "奇瑞",
    "问界", "理想", "蔚来", "小鹏", "零跑", "哪吒", "极氪", "领克",
];

/// Noise markers; any hit rejects the article outright.
pub const EXCLUDE_KEYWORDS: &[&str] = &[
    "视频", "短视频", "直播", "带货", "评测", "试驾",
    "车祸", "事故", "维权", "投诉", "召回",
    "二手车", "降价", "优惠",
];

/// Display metadata for a writing style.
#[derive(Debug, Clone, Copy)]
pub struct StyleInfo {
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

impl StyleInfo {
    /// `🎬 vlog风: 活泼口语，像拍视频时说的话`
    pub fn label(&self) -> String {
        format!("{} {}: {}", self.emoji, self.name, self.description)
    }
}

pub fn style_info(style: WritingStyle) -> StyleInfo {
    match style {
        WritingStyle::Vlog => StyleInfo {
            name: "vlog风",
            emoji: "🎬",
            description: "活泼口语，像拍视频时说的话",
        },
        WritingStyle::Review => StyleInfo {
            name: "专业评测风",
            emoji: "📊",
            description: "客观数据感，像老司机点评",
        },
        WritingStyle::Push => StyleInfo {
            name: "种草安利风",
            emoji: "❤️",
            description: "夸张情绪强，推荐购买",
        },
        WritingStyle::News => StyleInfo {
            name: "新闻报道风",
            emoji: "📰",
            description: "简洁客观，保持新闻性",
        },
    }
}

/// Display metadata for an output format.
#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub word_count: &'static str,
}

impl FormatInfo {
    /// `📝 短文案 (100-300字, 适合朋友圈、微博、头条号)`
    pub fn label(&self) -> String {
        format!(
            "{} {} ({}, {})",
            self.emoji, self.name, self.word_count, self.description
        )
    }
}

pub fn format_info(format: OutputFormat) -> FormatInfo {
    match format {
        OutputFormat::Short => FormatInfo {
            name: "短文案",
            emoji: "📝",
            description: "适合朋友圈、微博、头条号",
            word_count: "100-300字",
        },
        OutputFormat::Long => FormatInfo {
            name: "长文章",
            emoji: "📄",
            description: "适合公众号、博客、百家号",
            word_count: "500-1500字",
        },
    }
}

/// How the pipeline treats an empty selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Substitute the `all` pseudo-source.
    #[default]
    SubstituteAll,
    /// Refuse the fetch with `NoSourceSelected`.
    Strict,
}

/// Tunables for one [`crate::pipeline::NewsPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_surfaced: usize,
    pub search_max_results: usize,
    pub query_timeout: Duration,
    /// How many per-source queries run at once.
    pub concurrency: usize,
    pub selection_policy: SelectionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_surfaced: MAX_SURFACED,
            search_max_results: SEARCH_MAX_RESULTS,
            query_timeout: Duration::from_secs(10),
            concurrency: 4,
            selection_policy: SelectionPolicy::SubstituteAll,
        }
    }
}
