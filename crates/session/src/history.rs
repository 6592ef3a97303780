use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_HISTORY: usize = 5;

/// Recently analyzed repository URLs, newest first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentHistory {
    entries: Vec<String>,
}

impl RecentHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize an arbitrary list: the first occurrence of each URL wins.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new();
        for entry in entries {
            let entry = entry.into();
            if !history.entries.contains(&entry) && history.entries.len() < MAX_HISTORY {
                history.entries.push(entry);
            }
        }
        history
    }

    /// Move `url` to the front, dropping the oldest entry past the cap.
    pub fn record(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.entries.retain(|existing| *existing != url);
        self.entries.insert(0, url);
        self.entries.truncate(MAX_HISTORY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON file holding a [`RecentHistory`].
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/repolens/history.json`.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::data_dir().ok_or(SessionError::NoDataDir)?;
        Ok(Self::new(dir.join("repolens").join("history.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty history.
    pub fn load(&self) -> Result<RecentHistory> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let entries: Vec<String> = serde_json::from_str(&raw)?;
                Ok(RecentHistory::from_entries(entries))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(RecentHistory::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, history: &RecentHistory) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(history)?)?;
        log::debug!("Saved {} history entries to {}", history.entries.len(), self.path.display());
        Ok(())
    }

    /// Load, record `url`, save.
    pub fn record(&self, url: &str) -> Result<RecentHistory> {
        let mut history = self.load()?;
        history.record(url);
        self.save(&history)?;
        Ok(history)
    }
}
