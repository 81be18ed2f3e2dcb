//! Command-line interface definitions for Auto News Desk.
//!
//! Global options can be provided via flags or environment variables; every
//! action is a subcommand.

use crate::config::TIME_RANGES;
use crate::models::{OutputFormat, Theme, WritingStyle};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fetch, filter and rewrite automotive news.
///
/// # Examples
///
/// ```sh
/// # Fetch today's news from the persisted selection
/// auto_news_desk fetch
///
/// # Rewrite the second article of the last fetch as a long review
/// auto_news_desk rewrite 2 --format long --style review
///
/// # Use a backend proxy instead of Tavily
/// NEWS_PROXY_URL=http://localhost:5000 auto_news_desk fetch --days 3
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding history, settings and the seen-article ledger
    #[arg(long, env = "AUTO_NEWS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Tavily search API key
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    /// Tavily API base URL
    #[arg(long, env = "TAVILY_BASE_URL", default_value = "https://api.tavily.com")]
    pub tavily_base_url: String,

    /// Backend proxy base URL; takes precedence over Tavily when set
    #[arg(long, env = "NEWS_PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Rewrite service base URL; local templates are used when unset
    #[arg(long, env = "REWRITE_API_URL")]
    pub rewrite_url: Option<String>,

    /// Per-request timeout in seconds for search and rewrite calls
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List, add, remove or toggle news sources
    Sources {
        #[command(subcommand)]
        action: SourcesAction,
    },
    /// Fetch the latest articles from the selected sources
    Fetch(FetchArgs),
    /// Rewrite one article of the last fetch
    Rewrite(RewriteArgs),
    /// Rewrite the newest history entry again with the same format and style
    Regenerate(RegenerateArgs),
    /// Inspect and manage the rewrite history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SourcesAction {
    /// Show every source and whether it is selected
    List,
    /// Add a custom source
    Add {
        name: String,
        url: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a custom source
    Remove { id: String },
    /// Flip selection membership of one or more sources
    Toggle {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Time window in days: 1 (今天), 3 (3天内) or 7 (7天内)
    #[arg(short, long, default_value_t = 1, value_parser = parse_time_range)]
    pub days: u32,

    /// Refuse to fetch with an empty selection instead of searching all sources
    #[arg(long)]
    pub strict: bool,

    /// Print the articles as JSON
    #[arg(long)]
    pub json: bool,
}

/// Accept only the windows listed in [`TIME_RANGES`].
fn parse_time_range(raw: &str) -> Result<u32, String> {
    let days: u32 = raw.parse().map_err(|e| format!("{e}"))?;
    if TIME_RANGES.iter().any(|(d, _)| *d == days) {
        Ok(days)
    } else {
        let allowed: Vec<String> = TIME_RANGES.iter().map(|(d, _)| d.to_string()).collect();
        Err(format!("expected one of {}", allowed.join(", ")))
    }
}

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// 1-based position in the last fetched batch
    pub index: usize,

    /// Output format; defaults to the saved setting
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Writing style; defaults to the saved setting
    #[arg(short, long, value_enum)]
    pub style: Option<WritingStyle>,

    /// Ask the rewrite service for its deeper model
    #[arg(long)]
    pub deep: bool,

    /// Also save the result as a .txt file in this directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RegenerateArgs {
    #[arg(long)]
    pub deep: bool,

    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List history entries, newest first
    List,
    /// Print one entry in full
    Show { id: i64 },
    /// Delete one entry
    Delete { id: i64 },
    /// Delete every entry
    Clear,
    /// Write the history to a JSON file (or a stamped file in a directory)
    Export { path: PathBuf },
    /// Merge a previously exported JSON file into the history
    Import { path: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    Set {
        #[arg(long, value_enum)]
        theme: Option<Theme>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        #[arg(long, value_enum)]
        style: Option<WritingStyle>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_parsing() {
        let cli = Cli::parse_from(["auto_news_desk", "fetch", "--days", "3", "--strict"]);
        match cli.command {
            Command::Fetch(args) => {
                assert_eq!(args.days, 3);
                assert!(args.strict);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.timeout_secs, 10);
    }

    #[test]
    fn test_cli_days_limited_to_time_ranges() {
        for days in ["1", "3", "7"] {
            assert!(Cli::try_parse_from(["auto_news_desk", "fetch", "--days", days]).is_ok());
        }
        for days in ["0", "2", "200000000", "week"] {
            assert!(
                Cli::try_parse_from(["auto_news_desk", "fetch", "--days", days]).is_err(),
                "--days {days} accepted"
            );
        }
        match Cli::parse_from(["auto_news_desk", "fetch"]).command {
            Command::Fetch(args) => assert_eq!(args.days, 1),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rewrite_flags() {
        let cli = Cli::parse_from([
            "auto_news_desk",
            "--rewrite-url",
            "http://localhost:5000",
            "rewrite",
            "2",
            "-f",
            "long",
            "-s",
            "review",
        ]);
        assert_eq!(cli.rewrite_url.as_deref(), Some("http://localhost:5000"));
        match cli.command {
            Command::Rewrite(args) => {
                assert_eq!(args.index, 2);
                assert_eq!(args.format, Some(OutputFormat::Long));
                assert_eq!(args.style, Some(WritingStyle::Review));
                assert!(args.out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_sources_toggle_needs_ids() {
        assert!(Cli::try_parse_from(["auto_news_desk", "sources", "toggle"]).is_err());
        let cli = Cli::parse_from(["auto_news_desk", "sources", "toggle", "sina", "weibo"]);
        match cli.command {
            Command::Sources {
                action: SourcesAction::Toggle { ids },
            } => assert_eq!(ids, vec!["sina", "weibo"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_style() {
        assert!(Cli::try_parse_from(["auto_news_desk", "rewrite", "1", "-s", "poem"]).is_err());
    }
}
