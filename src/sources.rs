//! Source registry (built-in + custom sources) and the selection set.

use crate::config::{self, ALL_SOURCES_ID};
use crate::error::{NewsError, Result};
use crate::models::Source;
use crate::storage::Storage;
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Built-ins followed by `custom`, built-in first. Pure.
pub fn list_sources(custom: &[Source]) -> Vec<Source> {
    let mut all = config::builtin_sources();
    all.extend(custom.iter().cloned());
    all
}

/// Known sources for a session. Custom sources persist through [`Storage`].
#[derive(Debug)]
pub struct SourceRegistry {
    storage: Storage,
    custom: Vec<Source>,
}

impl SourceRegistry {
    pub fn load(storage: Storage) -> Self {
        let custom = storage.custom_sources();
        Self { storage, custom }
    }

    pub fn all(&self) -> Vec<Source> {
        list_sources(&self.custom)
    }

    pub fn custom(&self) -> &[Source] {
        &self.custom
    }

    pub fn find(&self, id: &str) -> Option<Source> {
        self.all().into_iter().find(|s| s.id == id)
    }

    pub fn display_name(&self, id: &str) -> String {
        self.find(id).map(|s| s.name).unwrap_or_else(|| id.to_string())
    }

    /// Search query for a source id.
    ///
    /// Built-ins carry a fixed template, custom sources are restricted to
    /// their host, and anything unknown searches the whole web.
    pub fn keyword_for(&self, id: &str) -> String {
        if let Some(keyword) = config::builtin_keyword(id) {
            return keyword.to_string();
        }
        match self.custom.iter().find(|s| s.id == id).and_then(|s| s.host()) {
            Some(host) => format!("site:{host} 汽车 新车"),
            None => config::all_sources_keyword().to_string(),
        }
    }

    #[instrument(level = "info", skip(self, icon, category))]
    pub fn add_custom(
        &mut self,
        name: &str,
        url: &str,
        icon: Option<String>,
        category: Option<String>,
    ) -> Result<Source> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NewsError::InvalidSource("name must not be empty".to_string()));
        }
        let parsed = url::Url::parse(url.trim())
            .map_err(|e| NewsError::InvalidSource(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(NewsError::InvalidSource(format!(
                "{url}: expected an http(s) URL"
            )));
        }

        let mut id = format!("custom_{}", Utc::now().timestamp_millis());
        while self.find(&id).is_some() {
            id.push('_');
        }
        let source = Source {
            id,
            name: name.to_string(),
            url: parsed.to_string(),
            icon,
            category,
            is_custom: true,
        };
        self.custom.push(source.clone());
        self.storage.save_custom_sources(&self.custom)?;
        info!(id = %source.id, name = %source.name, "Added custom source");
        Ok(source)
    }

    /// Delete a custom source. Built-ins cannot be removed.
    pub fn remove_custom(&mut self, id: &str) -> Result<Source> {
        let pos = self
            .custom
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| NewsError::UnknownSource(id.to_string()))?;
        let removed = self.custom.remove(pos);
        self.storage.save_custom_sources(&self.custom)?;
        info!(id, "Removed custom source");
        Ok(removed)
    }
}

/// Currently chosen source ids. A set: no duplicates, order irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Invert membership of `id`; unknown ids are simply added.
    pub fn toggle(&mut self, id: &str) -> &Self {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
        self
    }

    pub fn get_all(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn set_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Ids to query: the selection, or the `all` pseudo-source when empty.
    pub fn resolved(&self) -> Vec<String> {
        if self.ids.is_empty() {
            vec![ALL_SOURCES_ID.to_string()]
        } else {
            self.get_all()
        }
    }
}
