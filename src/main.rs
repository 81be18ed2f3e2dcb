//! # Auto News Desk
//!
//! Command-line front end: builds the session objects once, runs one
//! subcommand and renders the result on stdout. Logs go to stderr.
//!
//! ## Usage
//!
//! ```sh
//! auto_news_desk sources toggle sina
//! auto_news_desk fetch --days 3
//! auto_news_desk rewrite 1 --style push --out ./downloads
//! ```

use auto_news_desk::api::{RetryPolicy, RetryRewrite};
use auto_news_desk::cli::{
    Cli, Command, FetchArgs, HistoryAction, RegenerateArgs, RewriteArgs, SettingsAction,
    SourcesAction,
};
use auto_news_desk::config::{self, DEFAULT_SELECTION, PipelineConfig, SelectionPolicy};
use auto_news_desk::models::{Article, RewriteRecord, SettingsPatch};
use auto_news_desk::outputs::{json, text};
use auto_news_desk::pipeline::{HistoryLedger, NewsPipeline, Origin};
use auto_news_desk::rewrite::{LocalOnly, RemoteRewriter, RewriteBackend, RewriteOutcome, Rewriter};
use auto_news_desk::search::{ProxyClient, SearchBackend, TavilyClient};
use auto_news_desk::sources::{SelectionSet, SourceRegistry};
use auto_news_desk::storage::{FileStore, Storage};
use auto_news_desk::{NewsError, Result};
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    let data_dir = resolve_data_dir(args.data_dir.clone());
    debug!(data_dir = %data_dir.display(), command = ?args.command, "Parsed CLI arguments");

    let storage = Storage::new(FileStore::new(&data_dir));
    let timeout = Duration::from_secs(args.timeout_secs.max(1));

    match &args.command {
        Command::Sources { action } => run_sources(&storage, action)?,
        Command::Fetch(fetch) => run_fetch(&args, &storage, fetch, timeout).await?,
        Command::Rewrite(rw) => run_rewrite(&args, &storage, rw, timeout).await?,
        Command::Regenerate(rg) => run_regenerate(&args, &storage, rg, timeout).await?,
        Command::History { action } => run_history(&storage, action).await?,
        Command::Settings { action } => run_settings(&storage, action)?,
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
    Ok(())
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| dirs::data_local_dir().map(|d| d.join("auto-news-desk")))
        .unwrap_or_else(|| PathBuf::from(".auto-news-desk"))
}

/// Persisted selection, or the default trio on first run.
fn load_selection(storage: &Storage) -> SelectionSet {
    match storage.selection() {
        Some(ids) => SelectionSet::from_ids(ids),
        None => SelectionSet::from_ids(DEFAULT_SELECTION.iter().copied()),
    }
}

fn search_backend(args: &Cli, timeout: Duration) -> SearchBackend {
    if let Some(url) = &args.proxy_url {
        info!(%url, "Using backend proxy for search");
        SearchBackend::Proxy(ProxyClient::new(url.as_str(), timeout))
    } else if let Some(key) = args.tavily_api_key.as_deref().filter(|k| !k.is_empty()) {
        info!(base_url = %args.tavily_base_url, "Using Tavily for search");
        SearchBackend::Tavily(TavilyClient::new(args.tavily_base_url.as_str(), key, timeout))
    } else {
        warn!("No search backend configured; fetches will return sample data");
        SearchBackend::Offline
    }
}

fn rewriter(args: &Cli, timeout: Duration, deep: bool) -> Rewriter<RewriteBackend> {
    let backend = match &args.rewrite_url {
        Some(url) => RewriteBackend::Remote(RetryRewrite::new(
            RemoteRewriter::new(url.as_str(), timeout),
            RetryPolicy::default(),
        )),
        None => RewriteBackend::Local(LocalOnly),
    };
    Rewriter::new(backend).with_deep(deep)
}

fn run_sources(storage: &Storage, action: &SourcesAction) -> Result<()> {
    let mut registry = SourceRegistry::load(storage.clone());
    let mut selection = load_selection(storage);
    match action {
        SourcesAction::List => {
            for source in registry.all() {
                let mark = if selection.contains(&source.id) { "[x]" } else { "[ ]" };
                let kind = if source.is_custom { " (custom)" } else { "" };
                println!(
                    "{mark} {:<22} {} {}{kind}  {}",
                    source.id,
                    source.icon.as_deref().unwrap_or("📰"),
                    source.name,
                    source.url
                );
            }
        }
        SourcesAction::Add {
            name,
            url,
            icon,
            category,
        } => {
            let source = registry.add_custom(name, url, icon.clone(), category.clone())?;
            println!("added {} ({})", source.id, source.name);
        }
        SourcesAction::Remove { id } => {
            let removed = registry.remove_custom(id)?;
            if selection.contains(id) {
                selection.toggle(id);
                storage.save_selection(&selection.get_all())?;
            }
            println!("removed {} ({})", removed.id, removed.name);
        }
        SourcesAction::Toggle { ids } => {
            for id in ids {
                if registry.find(id).is_none() {
                    return Err(NewsError::UnknownSource(id.clone()));
                }
                selection.toggle(id);
            }
            storage.save_selection(&selection.get_all())?;
            println!("selected: {}", selection.get_all().join(", "));
        }
    }
    Ok(())
}

async fn run_fetch(args: &Cli, storage: &Storage, fetch: &FetchArgs, timeout: Duration) -> Result<()> {
    let registry = SourceRegistry::load(storage.clone());
    let selection = load_selection(storage);
    let mut ledger = HistoryLedger::load(storage.clone());
    let pipeline_config = PipelineConfig {
        query_timeout: timeout,
        selection_policy: if fetch.strict {
            SelectionPolicy::Strict
        } else {
            SelectionPolicy::SubstituteAll
        },
        ..Default::default()
    };
    let pipeline = NewsPipeline::new(search_backend(args, timeout), pipeline_config);

    let outcome = pipeline
        .fetch_news(&selection, &registry, &mut ledger, fetch.days)
        .await?;
    if !pipeline.is_current(outcome.ticket) {
        debug!("Superseded fetch result dropped");
        return Ok(());
    }
    storage.save_last_batch(&outcome.articles)?;

    if fetch.json {
        println!("{}", serde_json::to_string_pretty(&outcome.articles)?);
        return Ok(());
    }
    if outcome.origin == Origin::Sample {
        println!("(示例数据 sample data: live search returned nothing usable)");
    }
    for (i, article) in outcome.articles.iter().enumerate() {
        print_article(i + 1, article, &registry);
    }
    Ok(())
}

fn print_article(n: usize, article: &Article, registry: &SourceRegistry) {
    let when = article
        .publish_time
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "时间未知".to_string());
    let source = article
        .source_name
        .clone()
        .unwrap_or_else(|| registry.display_name(&article.source));
    println!("{n}. {}", article.title);
    println!("   {source} · {when}");
    if article.summary != article.title {
        println!("   {}", article.summary);
    }
    if article.has_real_url() {
        println!("   {}", article.url);
    }
}

async fn run_rewrite(args: &Cli, storage: &Storage, rw: &RewriteArgs, timeout: Duration) -> Result<()> {
    let batch = storage.last_batch();
    let article = rw
        .index
        .checked_sub(1)
        .and_then(|i| batch.get(i))
        .ok_or(NewsError::ArticleNotFound(rw.index))?;
    let settings = storage.settings();
    let format = rw.format.unwrap_or(settings.default_format);
    let style = rw.style.unwrap_or(settings.default_style);

    let mut rewriter = rewriter(args, timeout, rw.deep);
    let outcome = rewriter.rewrite(article, format, style).await;
    let record = storage.save_history(article, &outcome.text, format, style)?;
    render_rewrite(&record, &outcome, rw.out.as_deref()).await
}

async fn run_regenerate(
    args: &Cli,
    storage: &Storage,
    rg: &RegenerateArgs,
    timeout: Duration,
) -> Result<()> {
    let mut rewriter = rewriter(args, timeout, rg.deep);
    if let Some(newest) = storage.history().first() {
        rewriter.restore(newest);
    }
    let outcome = rewriter.regenerate().await?;
    let last = rewriter
        .last_request()
        .ok_or(NewsError::NothingToRegenerate)?;
    let record = storage.save_history(&last.news, &outcome.text, last.format, last.style)?;
    render_rewrite(&record, &outcome, rg.out.as_deref()).await
}

async fn render_rewrite(record: &RewriteRecord, outcome: &RewriteOutcome, out: Option<&Path>) -> Result<()> {
    println!(
        "{}\n{}\n({:?})\n",
        config::format_info(record.format).label(),
        config::style_info(record.style).label(),
        outcome.source
    );
    println!("{}", outcome.text);
    if let Some(dir) = out {
        let path = text::write_download(record, dir).await?;
        println!("\nsaved to {}", path.display());
    }
    Ok(())
}

async fn run_history(storage: &Storage, action: &HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let history = storage.history();
            if history.is_empty() {
                println!("暂无历史记录 (history is empty)");
            }
            for record in history {
                println!(
                    "{}  {}  {}/{}  {}",
                    record.id,
                    record.timestamp.with_timezone(&chrono::Local).format("%m-%d %H:%M"),
                    record.format.as_str(),
                    record.style.as_str(),
                    record.original_news.title
                );
            }
        }
        HistoryAction::Show { id } => {
            let record = storage
                .history()
                .into_iter()
                .find(|r| r.id == *id)
                .ok_or(NewsError::HistoryNotFound(*id))?;
            println!("{}\n\n{}", record.original_news.title, record.result);
        }
        HistoryAction::Delete { id } => {
            storage.delete_history(*id)?;
            println!("deleted {id}");
        }
        HistoryAction::Clear => {
            storage.clear_history()?;
            println!("history cleared");
        }
        HistoryAction::Export { path } => {
            let written = json::export_history(storage, path).await?;
            println!("exported to {}", written.display());
        }
        HistoryAction::Import { path } => {
            let total = json::import_history(storage, path).await?;
            println!("history now holds {total} records");
        }
    }
    Ok(())
}

fn run_settings(storage: &Storage, action: &SettingsAction) -> Result<()> {
    let settings = match action {
        SettingsAction::Show => storage.settings(),
        SettingsAction::Set {
            theme,
            format,
            style,
        } => storage.save_settings(&SettingsPatch {
            theme: *theme,
            default_format: *format,
            default_style: *style,
        })?,
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
