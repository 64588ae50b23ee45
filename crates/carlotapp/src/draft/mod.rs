//! # Draft Persistence
//!
//! Snapshots of an in-progress sell form, kept in a durable key-value store
//! so the form survives reloads and the sign-in redirect-and-return flow.
//!
//! ## Lifecycle
//!
//! 1. **Created** on the first field edit.
//! 2. **Overwritten** on every later change.
//! 3. **Read once** when the form mounts.
//! 4. **Deleted** right after a successful submission, or on explicit discard.
//!
//! ## Failure Policy
//!
//! Drafts are a convenience, never a reason to break the form:
//! - Saving past the quota, or into an unavailable store, is logged and
//!   ignored.
//! - A missing key and an undecodable value both read as "no draft".
//!
//! ## Concurrent Tabs
//!
//! The store is one global namespace. Two tabs editing the same draft key
//! race with last-write-wins semantics. Each save carries a `revision`, and
//! [`DraftStore::load_draft_newer_than`] lets a tab refuse a draft older than
//! what it already shows.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one JSON file per key.
//! - [`mem_backend::MemBackend`]: in memory, with quota and error injection.

use crate::model::{CascadeState, Id};
use crate::wizard::WizardStep;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::KvBackend;

/// A persisted snapshot of the sell form.
///
/// `cascade` has exactly the shape [`CascadeSelector::restore`] accepts.
///
/// [`CascadeSelector::restore`]: crate::cascade::CascadeSelector::restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub revision: u64,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub step: WizardStep,
    pub cascade: CascadeState,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Multi-select ids, keyed by group (e.g. `"features"`).
    #[serde(default)]
    pub selected: BTreeMap<String, Vec<Id>>,
}

impl Draft {
    pub fn new(cascade: CascadeState) -> Self {
        Self {
            revision: 0,
            saved_at: Utc::now(),
            step: WizardStep::default(),
            cascade,
            fields: BTreeMap::new(),
            selected: BTreeMap::new(),
        }
    }
}

/// Draft access on top of a [`KvBackend`].
pub struct DraftStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> DraftStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persist `draft` under `key`, replacing any previous one.
    ///
    /// Returns whether the draft was written. Failures are logged, not raised.
    pub fn save_draft(&self, key: &str, draft: &Draft) -> bool {
        let encoded = match serde_json::to_string(draft) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(key, error = %err, "draft could not be encoded");
                return false;
            }
        };
        match self.backend.set(key, &encoded) {
            Ok(()) => {
                tracing::debug!(key, revision = draft.revision, "draft saved");
                true
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "draft could not be saved");
                false
            }
        }
    }

    /// The saved draft, or `None` when absent, unreadable or corrupt.
    pub fn load_draft(&self, key: &str) -> Option<Draft> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key, error = %err, "draft store unavailable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring corrupt draft");
                None
            }
        }
    }

    /// Like [`DraftStore::load_draft`], but only a draft strictly newer than
    /// `revision`.
    pub fn load_draft_newer_than(&self, key: &str, revision: u64) -> Option<Draft> {
        self.load_draft(key).filter(|draft| draft.revision > revision)
    }

    /// Remove the draft. Returns whether the store accepted the removal.
    pub fn clear_draft(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key, error = %err, "draft could not be cleared");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mem_backend::MemBackend;
    use super::*;
    use crate::model::TierSelection;

    fn sample() -> Draft {
        let mut draft = Draft::new(CascadeState {
            tiers: vec![
                TierSelection {
                    tier: "year".into(),
                    selected_id: Some(Id::from("2024")),
                    selected_label: "2024".into(),
                },
                TierSelection::empty("make"),
            ],
        });
        draft.revision = 3;
        draft.step = WizardStep::Details;
        draft.fields.insert("price".into(), "2500000".into());
        draft
            .selected
            .insert("features".into(), vec![Id::from("7"), Id::from("9")]);
        draft
    }

    #[test]
    fn save_then_load_is_deep_equal() {
        let store = DraftStore::new(MemBackend::new());
        let draft = sample();
        assert!(store.save_draft("sell", &draft));
        assert_eq!(store.load_draft("sell"), Some(draft));
    }

    #[test]
    fn missing_and_corrupt_drafts_read_as_none() {
        let store = DraftStore::new(MemBackend::new());
        assert_eq!(store.load_draft("never-saved"), None);

        store.backend().insert_raw("sell", "{ not json");
        assert_eq!(store.load_draft("sell"), None);

        store.backend().insert_raw("sell", "{\"revision\": \"three\"}");
        assert_eq!(store.load_draft("sell"), None);
    }

    #[test]
    fn quota_failures_are_swallowed() {
        let store = DraftStore::new(MemBackend::new().with_quota(16));
        assert!(!store.save_draft("sell", &sample()));
        assert_eq!(store.load_draft("sell"), None);
    }

    #[test]
    fn older_revisions_are_refused() {
        let store = DraftStore::new(MemBackend::new());
        store.save_draft("sell", &sample());
        assert!(store.load_draft_newer_than("sell", 2).is_some());
        assert!(store.load_draft_newer_than("sell", 3).is_none());
    }

    #[test]
    fn clear_removes_and_reports_failures() {
        let store = DraftStore::new(MemBackend::new());
        store.save_draft("sell", &sample());
        assert!(store.clear_draft("sell"));
        assert_eq!(store.load_draft("sell"), None);

        store.backend().set_simulate_write_error(true);
        assert!(!store.clear_draft("sell"));
    }

    #[test]
    fn older_payloads_without_optional_fields_still_load() {
        let store = DraftStore::new(MemBackend::new());
        store.backend().insert_raw(
            "sell",
            r#"{"revision":1,"saved_at":"2026-01-01T00:00:00Z","cascade":{"tiers":[]}}"#,
        );
        let draft = store.load_draft("sell").unwrap();
        assert_eq!(draft.step, WizardStep::Vehicle);
        assert!(draft.fields.is_empty());
    }
}
