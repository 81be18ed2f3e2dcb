//! Rewrite history export and import files.
//!
//! The export is the pretty-printed history array, newest first, in the same
//! camelCase shape the store keeps. Import accepts that shape back.

use crate::error::Result;
use crate::storage::Storage;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub fn export_file_name() -> String {
    format!("rewrite_history_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Export the history to `path`, or to a stamped file inside it when `path`
/// is a directory.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn export_history(storage: &Storage, path: &Path) -> Result<PathBuf> {
    let target = if path.is_dir() {
        path.join(export_file_name())
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        path.to_path_buf()
    };
    let json = storage.export_history()?;
    fs::write(&target, json).await?;
    info!(path = %target.display(), records = storage.history().len(), "Exported rewrite history");
    Ok(target)
}

/// Import a history export; returns the resulting history length.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn import_history(storage: &Storage, path: &Path) -> Result<usize> {
    let json = fs::read_to_string(path).await?;
    let total = storage.import_history(&json)?;
    info!(total, "Imported rewrite history");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewsError;
    use crate::models::{Article, OutputFormat, WritingStyle};

    fn article(title: &str) -> Article {
        Article {
            id: title.to_string(),
            title: title.to_string(),
            summary: String::new(),
            source: "yiche".to_string(),
            source_name: None,
            url: "#".to_string(),
            publish_time: None,
        }
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_store() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Storage::in_memory();
        source
            .save_history(&article("A"), "文案A", OutputFormat::Short, WritingStyle::Vlog)
            .unwrap();
        source
            .save_history(&article("B"), "文案B", OutputFormat::Long, WritingStyle::News)
            .unwrap();

        let path = export_history(&source, tmp.path()).await.unwrap();
        assert!(path.starts_with(tmp.path()));

        let target = Storage::in_memory();
        assert_eq!(import_history(&target, &path).await.unwrap(), 2);
        let titles: Vec<_> = target
            .history()
            .into_iter()
            .map(|r| r.original_news.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = import_history(&Storage::in_memory(), &path).await.unwrap_err();
        assert!(matches!(err, NewsError::Json(_)));
    }
}
