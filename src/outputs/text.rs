//! Plain-text download of a rewrite result.

use crate::error::Result;
use crate::models::RewriteRecord;
use crate::utils::{ensure_writable_dir, slugify_title};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// `{slug}_{YYYYmmdd_HHMMSS}.txt`, stamped in local time.
pub fn download_file_name(title: &str, at: DateTime<Utc>) -> String {
    let stamp = at.with_timezone(&Local).format("%Y%m%d_%H%M%S");
    format!("{}_{}.txt", slugify_title(title), stamp)
}

/// Write `record.result` into `out_dir` and return the file path.
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display(), record = record.id))]
pub async fn write_download(record: &RewriteRecord, out_dir: &Path) -> Result<PathBuf> {
    ensure_writable_dir(out_dir).await?;
    let path = out_dir.join(download_file_name(&record.original_news.title, record.timestamp));
    fs::write(&path, &record.result).await?;
    info!(path = %path.display(), bytes = record.result.len(), "Wrote rewrite download");
    Ok(path)
}
