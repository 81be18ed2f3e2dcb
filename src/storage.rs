//! Key-value persistence.
//!
//! [`KvStore`] is the string-keyed, string-valued contract the rest of the
//! crate relies on. [`FileStore`] keeps one JSON file per key under a data
//! directory; [`MemoryStore`] backs tests and throwaway sessions. [`Storage`]
//! layers the typed accessors (rewrite history, custom sources, settings,
//! seen-URL ledger, selection, last fetched batch) on top.

use crate::config::REWRITE_HISTORY_CAPACITY;
use crate::error::{NewsError, Result};
use crate::models::{
    Article, OutputFormat, RewriteRecord, Settings, SettingsPatch, Source, WritingStyle,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

pub const HISTORY_KEY: &str = "auto_news_history";
pub const CUSTOM_SOURCES_KEY: &str = "auto_news_custom_sources";
pub const SETTINGS_KEY: &str = "auto_news_settings";
pub const SEEN_URLS_KEY: &str = "auto_news_seen_urls";
pub const SELECTION_KEY: &str = "auto_news_selection";
pub const LAST_BATCH_KEY: &str = "auto_news_last_batch";

/// String-keyed, string-valued store that survives restarts.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // write-then-rename so a crash never leaves half a file behind
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "Stored key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| NewsError::Storage("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| NewsError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| NewsError::Storage("memory store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Typed view over a [`KvStore`]. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KvStore>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(store: impl KvStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Read and decode a key. Unreadable or corrupt values are logged and
    /// treated as absent so one bad file never blocks the session.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored value; using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored value is not valid JSON; using default");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    // ---- rewrite history ----

    /// Newest first.
    pub fn history(&self) -> Vec<RewriteRecord> {
        self.read(HISTORY_KEY).unwrap_or_default()
    }

    #[instrument(level = "info", skip_all, fields(format = format.as_str(), style = style.as_str()))]
    pub fn save_history(
        &self,
        article: &Article,
        result: &str,
        format: OutputFormat,
        style: WritingStyle,
    ) -> Result<RewriteRecord> {
        let mut history = self.history();
        let now = Utc::now();
        // ids are creation millis; bump on collision so deletes stay unambiguous
        let newest = history.iter().map(|r| r.id).max().unwrap_or(i64::MIN);
        let id = now.timestamp_millis().max(newest.saturating_add(1));

        let record = RewriteRecord {
            id,
            original_news: article.clone(),
            result: result.to_string(),
            format,
            style,
            timestamp: now,
        };
        history.insert(0, record.clone());
        history.truncate(REWRITE_HISTORY_CAPACITY);
        self.write(HISTORY_KEY, &history)?;
        Ok(record)
    }

    pub fn delete_history(&self, id: i64) -> Result<()> {
        let mut history = self.history();
        let before = history.len();
        history.retain(|r| r.id != id);
        if history.len() == before {
            return Err(NewsError::HistoryNotFound(id));
        }
        self.write(HISTORY_KEY, &history)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn export_history(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.history())?)
    }

    /// Merge exported records in front of the current history, capped.
    /// Returns how many records the history holds afterwards.
    pub fn import_history(&self, json: &str) -> Result<usize> {
        let imported: Vec<RewriteRecord> = serde_json::from_str(json)?;
        let mut merged = imported;
        merged.extend(self.history());
        merged.truncate(REWRITE_HISTORY_CAPACITY);
        self.write(HISTORY_KEY, &merged)?;
        Ok(merged.len())
    }

    // ---- custom sources ----

    pub fn custom_sources(&self) -> Vec<Source> {
        self.read(CUSTOM_SOURCES_KEY).unwrap_or_default()
    }

    pub fn save_custom_sources(&self, sources: &[Source]) -> Result<()> {
        self.write(CUSTOM_SOURCES_KEY, sources)
    }

    // ---- settings ----

    pub fn settings(&self) -> Settings {
        self.read(SETTINGS_KEY).unwrap_or_default()
    }

    pub fn save_settings(&self, patch: &SettingsPatch) -> Result<Settings> {
        let merged = self.settings().merged(patch);
        self.write(SETTINGS_KEY, &merged)?;
        Ok(merged)
    }

    // ---- seen-URL ledger ----

    pub fn seen_urls(&self) -> Vec<String> {
        self.read(SEEN_URLS_KEY).unwrap_or_default()
    }

    pub fn save_seen_urls(&self, urls: &[String]) -> Result<()> {
        self.write(SEEN_URLS_KEY, urls)
    }

    // ---- session state ----

    pub fn selection(&self) -> Option<Vec<String>> {
        self.read(SELECTION_KEY)
    }

    pub fn save_selection(&self, ids: &[String]) -> Result<()> {
        self.write(SELECTION_KEY, ids)
    }

    pub fn last_batch(&self) -> Vec<Article> {
        self.read(LAST_BATCH_KEY).unwrap_or_default()
    }

    pub fn save_last_batch(&self, articles: &[Article]) -> Result<()> {
        self.write(LAST_BATCH_KEY, articles)
    }
}
