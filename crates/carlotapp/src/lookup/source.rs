use crate::error::{CarlotError, Result};
use crate::model::{Id, LookupKind, LookupOption};
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

/// Abstract interface for the backend's lookup endpoints.
///
/// One call per list: makes, models of a make, versions of a model, and the
/// flat lists. Implementations must return an empty vec for "no results",
/// never an error.
///
/// The trait is `?Send`: the library runs on a single-threaded event loop,
/// like the pages it serves.
#[async_trait(?Send)]
pub trait LookupSource {
    async fn fetch(&self, kind: LookupKind, parent: Option<&Id>) -> Result<Vec<LookupOption>>;
}

/// In-memory lookup source over a fixed option table.
///
/// Options of a parent-filtered kind are returned when their `parent_id`
/// matches the requested parent, or when they have no parent at all.
///
/// Uses `RefCell`/`Cell` for failure injection and call counting, so tests
/// can drive error paths through a shared `&self`.
#[derive(Default)]
pub struct StaticLookups {
    table: HashMap<LookupKind, Vec<LookupOption>>,
    failing: RefCell<HashSet<LookupKind>>,
    calls: Cell<usize>,
}

impl StaticLookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: LookupKind, options: Vec<LookupOption>) -> Self {
        self.table.entry(kind).or_default().extend(options);
        self
    }

    pub fn insert(&mut self, kind: LookupKind, option: LookupOption) {
        self.table.entry(kind).or_default().push(option);
    }

    /// Make every fetch of `kind` fail until [`StaticLookups::recover`] is called.
    pub fn fail(&self, kind: LookupKind) {
        self.failing.borrow_mut().insert(kind);
    }

    pub fn recover(&self, kind: LookupKind) {
        self.failing.borrow_mut().remove(&kind);
    }

    /// Number of fetches served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Synchronous lookup used by the async `fetch`.
    pub fn lookup(&self, kind: LookupKind, parent: Option<&Id>) -> Result<Vec<LookupOption>> {
        self.calls.set(self.calls.get() + 1);

        if self.failing.borrow().contains(&kind) {
            return Err(CarlotError::fetch(kind, "lookup endpoint unavailable"));
        }

        let Some(options) = self.table.get(&kind) else {
            return Ok(Vec::new());
        };

        Ok(options
            .iter()
            .filter(|opt| match (parent, &opt.parent_id) {
                (Some(p), Some(owner)) => p == owner,
                _ => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait(?Send)]
impl LookupSource for StaticLookups {
    async fn fetch(&self, kind: LookupKind, parent: Option<&Id>) -> Result<Vec<LookupOption>> {
        self.lookup(kind, parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> StaticLookups {
        StaticLookups::new()
            .with(
                LookupKind::Makes,
                vec![LookupOption::new("1", "Toyota"), LookupOption::new("2", "Honda")],
            )
            .with(
                LookupKind::Models,
                vec![
                    LookupOption::new("10", "Corolla").with_parent("1"),
                    LookupOption::new("11", "Yaris").with_parent("1"),
                    LookupOption::new("20", "Civic").with_parent("2"),
                ],
            )
    }

    #[test]
    fn filters_children_by_parent() {
        let src = source();
        let models = src.lookup(LookupKind::Models, Some(&Id::from("1"))).unwrap();
        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Corolla", "Yaris"]);
    }

    #[test]
    fn unparented_options_ignore_parent() {
        let src = source();
        let makes = src.lookup(LookupKind::Makes, Some(&Id::from("2024"))).unwrap();
        assert_eq!(makes.len(), 2);
    }

    #[test]
    fn unknown_kind_is_empty_not_error() {
        let src = source();
        assert!(src.lookup(LookupKind::Colors, None).unwrap().is_empty());
    }

    #[test]
    fn injected_failure_and_recovery() {
        let src = source();
        src.fail(LookupKind::Makes);
        assert!(matches!(
            src.lookup(LookupKind::Makes, None),
            Err(CarlotError::Fetch { kind: LookupKind::Makes, .. })
        ));
        src.recover(LookupKind::Makes);
        assert_eq!(src.lookup(LookupKind::Makes, None).unwrap().len(), 2);
        assert_eq!(src.calls(), 2);
    }
}
