//! Capture log store.
//!
//! # Responsibility
//! - Own the authoritative most-recent-first list of captured snippets.
//! - Persist the full list after every mutation (write-through).
//!
//! # Invariants
//! - No two entries share a `(content, source_url)` pair.
//! - The list never holds more than [`CAPTURE_LOG_CAPACITY`] entries; the
//!   oldest entries are evicted from the tail.
//! - A failed write leaves the in-memory list untouched.

use crate::model::capture::{normalize_content, CaptureEntry, EntryId};
use crate::repo::kv_repo::{load_list, save_list, KvRepository, RepoError, CLIPBOARD_KEY};
use crate::service::store_error::StoreResult;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Maximum number of retained capture entries.
pub const CAPTURE_LOG_CAPACITY: usize = 100;

/// Bounded, deduplicated capture log backed by a key-value repository.
pub struct CaptureLogStore<R: KvRepository> {
    repo: R,
    entries: Vec<CaptureEntry>,
}

impl<R: KvRepository> CaptureLogStore<R> {
    /// Restores the persisted log.
    ///
    /// Duplicate keys and overflow left by older writers are dropped in
    /// memory; the next mutation persists the cleaned list.
    pub fn load(repo: R) -> StoreResult<Self> {
        let stored: Vec<CaptureEntry> = load_list(&repo, CLIPBOARD_KEY)?;
        let stored_len = stored.len();

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(stored_len.min(CAPTURE_LOG_CAPACITY));
        for entry in stored {
            entry.validate().map_err(|err| RepoError::InvalidData {
                key: CLIPBOARD_KEY.to_string(),
                message: err.to_string(),
            })?;
            if seen.insert((entry.content.clone(), entry.source_url.clone())) {
                entries.push(entry);
            }
        }
        entries.truncate(CAPTURE_LOG_CAPACITY);

        if entries.len() != stored_len {
            warn!(
                "event=capture_load module=capture status=normalized stored={} kept={}",
                stored_len,
                entries.len()
            );
        }
        info!(
            "event=capture_load module=capture status=ok entries={}",
            entries.len()
        );
        Ok(Self { repo, entries })
    }

    /// Submits a capture candidate.
    ///
    /// Returns `Ok(false)` for blank content or an existing dedup key.
    pub fn submit(
        &mut self,
        content: &str,
        source_url: &str,
        source_title: &str,
    ) -> StoreResult<bool> {
        let Some(entry) = CaptureEntry::new(content, source_url, source_title) else {
            debug!("event=capture_submit module=capture status=rejected reason=empty");
            return Ok(false);
        };
        if self.contains_key(&entry.content, &entry.source_url) {
            debug!(
                "event=capture_submit module=capture status=rejected reason=duplicate content_len={}",
                entry.content.len()
            );
            return Ok(false);
        }

        let content_len = entry.content.len();
        let mut next = Vec::with_capacity(CAPTURE_LOG_CAPACITY + 1);
        next.push(entry);
        next.extend(self.entries.iter().cloned());
        let evicted = next.len().saturating_sub(CAPTURE_LOG_CAPACITY);
        next.truncate(CAPTURE_LOG_CAPACITY);

        self.commit(next)?;
        info!(
            "event=capture_submit module=capture status=ok content_len={content_len} evicted={evicted} entries={}",
            self.entries.len()
        );
        Ok(true)
    }

    /// Replaces the content of one entry.
    ///
    /// Returns `Ok(false)` for an unknown id, blank content, or content that
    /// would duplicate another entry from the same source.
    pub fn edit(&mut self, id: EntryId, new_content: &str) -> StoreResult<bool> {
        let Some(content) = normalize_content(new_content) else {
            return Ok(false);
        };
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let source_url = &self.entries[index].source_url;
        let collides = self
            .entries
            .iter()
            .any(|other| other.id != id && other.has_key(&content, source_url));
        if collides {
            debug!("event=capture_edit module=capture status=rejected reason=duplicate");
            return Ok(false);
        }

        let mut next = self.entries.clone();
        next[index].content = content;
        self.commit(next)?;
        info!("event=capture_edit module=capture status=ok");
        Ok(true)
    }

    /// Removes one entry. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: EntryId) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.entries.clone();
        next.remove(index);
        self.commit(next)?;
        info!(
            "event=capture_remove module=capture status=ok entries={}",
            self.entries.len()
        );
        Ok(true)
    }

    /// Empties the log.
    pub fn clear(&mut self) -> StoreResult<()> {
        let removed = self.entries.len();
        self.commit(Vec::new())?;
        info!("event=capture_clear module=capture status=ok removed={removed}");
        Ok(())
    }

    /// Returns entries whose content, url or title contain `search_term`,
    /// ignoring case, in stored order.
    pub fn query(&self, search_term: &str) -> Vec<CaptureEntry> {
        let needle = search_term.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> &[CaptureEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&CaptureEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn contains_key(&self, content: &str, source_url: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.has_key(content, source_url))
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn commit(&mut self, next: Vec<CaptureEntry>) -> StoreResult<()> {
        if let Err(err) = save_list(&self.repo, CLIPBOARD_KEY, &next) {
            warn!("event=capture_persist module=capture status=error error={err}");
            return Err(err.into());
        }
        self.entries = next;
        Ok(())
    }
}
