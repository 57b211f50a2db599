//! Research summary store: one JSON document keyed by (subject, platform).
//!
//! The whole map is loaded on open and rewritten on every mutation. Writes
//! go to a sibling temp file and are renamed into place. There is no
//! locking: two processes updating the same document can lose each other's
//! changes.
//!
//! The infallible API absorbs I/O failures: an unreadable document opens as
//! an empty store, and a failed write is logged while the in-memory map
//! keeps the change. Use [`ResearchStore::try_load`] and
//! [`ResearchStore::try_flush`] to observe those failures.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{TimeDelta, Utc};
use tracing::{debug, info, warn};

use crate::config::ResearchConfig;
use crate::error::StoreError;

use super::projection::{render, ContentKind, NO_SUMMARY};
use super::summary::{ResearchBatch, ResearchSummary};

pub struct ResearchStore {
    path: PathBuf,
    summaries: BTreeMap<String, ResearchSummary>,
    max_retained_snippets: usize,
    max_age_days: u32,
}

impl ResearchStore {
    /// Open the document at `path`. Missing or unreadable documents yield an
    /// empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load research summaries, starting empty");
                Self::empty(path)
            }
        }
    }

    pub fn from_config(config: &ResearchConfig) -> Self {
        let mut store = Self::open(&config.cache_path);
        store.max_retained_snippets = config.max_retained_snippets;
        store.max_age_days = config.max_age_days;
        store
    }

    /// Load the document, surfacing I/O and decode failures.
    ///
    /// A missing file is not an error.
    pub fn try_load(path: &Path) -> Result<Self, StoreError> {
        let mut store = Self::empty(path);
        if !path.exists() {
            return Ok(store);
        }
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        store.summaries = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), entries = store.summaries.len(), "loaded research summaries");
        Ok(store)
    }

    fn empty(path: impl Into<PathBuf>) -> Self {
        let defaults = ResearchConfig::default();
        Self {
            path: path.into(),
            summaries: BTreeMap::new(),
            max_retained_snippets: defaults.max_retained_snippets,
            max_age_days: defaults.max_age_days,
        }
    }

    pub fn with_max_retained_snippets(mut self, max: usize) -> Self {
        self.max_retained_snippets = max.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, subject: &str, platform: &str) -> Option<&ResearchSummary> {
        self.summaries.get(&ResearchSummary::key(subject, platform))
    }

    /// Derive a summary from `batch` without storing it.
    pub fn create(&self, subject: &str, platform: &str, batch: &ResearchBatch) -> ResearchSummary {
        ResearchSummary::derive(subject, platform, batch, self.max_retained_snippets)
    }

    /// Insert or replace a summary and persist the document.
    pub fn save(&mut self, summary: ResearchSummary) {
        let key = summary.storage_key();
        info!(key = %key, confidence = summary.confidence_score, "saved research summary");
        self.summaries.insert(key, summary);
        self.flush();
    }

    /// Merge `batch` into the existing summary (or create one) and persist.
    pub fn update(&mut self, subject: &str, platform: &str, batch: &ResearchBatch) -> ResearchSummary {
        let summary = match self.get(subject, platform) {
            Some(existing) => {
                let merged = existing.merged_with(batch, self.max_retained_snippets);
                debug!(
                    subject,
                    platform,
                    previous = existing.confidence_score,
                    confidence = merged.confidence_score,
                    "updated research summary"
                );
                merged
            }
            None => {
                debug!(subject, platform, "created research summary");
                self.create(subject, platform, batch)
            }
        };
        self.save(summary.clone());
        summary
    }

    /// Prompt-ready text for `kind`, or a fixed notice when nothing is stored.
    pub fn project(&self, subject: &str, platform: &str, kind: ContentKind) -> String {
        match self.get(subject, platform) {
            Some(summary) => render(summary, kind),
            None => NO_SUMMARY.to_string(),
        }
    }

    /// Drop entries last updated more than `days` ago. Returns how many were
    /// removed; the document is rewritten only when that is non-zero.
    pub fn cleanup_older_than(&mut self, days: u32) -> usize {
        // An age reaching past the earliest representable date expires nothing.
        let Some(cutoff) = TimeDelta::try_days(i64::from(days))
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            debug!(days, "cleanup age out of range, nothing to drop");
            return 0;
        };
        let before = self.summaries.len();
        self.summaries.retain(|_, s| s.last_updated >= cutoff);
        let removed = before - self.summaries.len();
        if removed > 0 {
            info!(removed, days, "cleaned up old research summaries");
            self.flush();
        }
        removed
    }

    /// [`cleanup_older_than`](Self::cleanup_older_than) with the configured age.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_older_than(self.max_age_days)
    }

    /// Snapshot of every stored summary.
    pub fn all(&self) -> BTreeMap<String, ResearchSummary> {
        self.summaries.clone()
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    fn flush(&self) {
        if let Err(e) = self.try_flush() {
            warn!(path = %self.path.display(), error = %e, "failed to save research summaries");
        }
    }

    /// Write the whole document: temp file, then rename.
    pub fn try_flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&self.summaries)?;
        std::fs::write(&temp_path, content).map_err(|e| StoreError::io(&temp_path, e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ResearchStore {
        ResearchStore::open(dir.path().join("research_summaries.json"))
    }

    fn batch() -> ResearchBatch {
        ResearchBatch::new(
            ["Adversaries invoke rundll32 to proxy execution of malicious DLL payloads on hosts."],
            ["attack.mitre.org"],
        )
    }

    #[test]
    fn test_missing_document_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
        assert!(store.get("T1218", "windows").is_none());
    }

    #[test]
    fn test_corrupt_document_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("research_summaries.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(ResearchStore::try_load(&path), Err(StoreError::Json(_))));
        assert!(ResearchStore::open(&path).is_empty());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let created = store.update("T1218", "Windows", &batch());
        assert_eq!(created.tools_mentioned, vec!["rundll32"]);
        assert_eq!(store.len(), 1);

        let reopened = store_in(&dir);
        let loaded = reopened.get("T1218", "WINDOWS").unwrap();
        assert_eq!(loaded.subject, "T1218");
        assert_eq!(loaded.tools_mentioned, created.tools_mentioned);
        assert!(reopened.all().contains_key("T1218_windows"));
        assert!(!dir.path().join("research_summaries.json.tmp").exists());
    }

    #[test]
    fn test_create_does_not_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let summary = store.create("T1218", "windows", &batch());
        assert_eq!(summary.source_count, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_project_without_summary() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(
            store.project("T9999", "linux", ContentKind::Detection),
            NO_SUMMARY
        );
    }

    #[test]
    fn test_cleanup_drops_stale_entries() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let mut stale = store.create("T1003", "windows", &batch());
        stale.last_updated = Utc::now() - chrono::Duration::days(45);
        store.save(stale);
        store.update("T1218", "windows", &batch());

        assert_eq!(store.cleanup_older_than(60), 0);
        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("T1003", "windows").is_none());
        assert_eq!(store_in(&dir).len(), 1);
    }

    #[test]
    fn test_cleanup_with_unbounded_age_keeps_everything() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.update("T1218", "windows", &batch());

        assert_eq!(store.cleanup_older_than(u32::MAX), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_write_failure_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let mut store = ResearchStore::open(blocker.join("research_summaries.json"));
        let summary = store.update("T1218", "windows", &batch());

        assert_eq!(summary.subject, "T1218");
        assert_eq!(store.len(), 1);
        assert!(store.try_flush().is_err());
    }
}
