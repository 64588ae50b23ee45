use super::source::LookupSource;
use crate::error::Result;
use crate::model::{Id, LookupKind, LookupOption};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone)]
struct TierSlot {
    parent: Option<Id>,
    options: Vec<LookupOption>,
    status: LoadStatus,
    /// Generation of the one fetch allowed to fill this slot.
    pending: Option<u64>,
    /// Statically known options survive invalidation.
    fixed: bool,
}

impl TierSlot {
    fn idle() -> Self {
        Self {
            parent: None,
            options: Vec::new(),
            status: LoadStatus::Idle,
            pending: None,
            fixed: false,
        }
    }
}

/// Last fetched option list per cascade tier.
///
/// A new fetch discards the previous list instead of merging into it, and
/// only the result carrying the generation recorded by [`LookupCache::begin`]
/// may fill the slot.
#[derive(Debug, Clone)]
pub struct LookupCache {
    slots: Vec<TierSlot>,
}

impl LookupCache {
    pub fn new(tiers: usize) -> Self {
        Self {
            slots: vec![TierSlot::idle(); tiers],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Install a fixed option domain (e.g. model years) for a tier.
    pub fn preload(&mut self, tier: usize, options: Vec<LookupOption>) {
        if let Some(slot) = self.slots.get_mut(tier) {
            slot.options = options;
            slot.status = LoadStatus::Loaded;
            slot.pending = None;
            slot.fixed = true;
        }
    }

    /// Mark a tier as loading for `generation`, dropping whatever it held.
    pub fn begin(&mut self, tier: usize, parent: Option<Id>, generation: u64) {
        if let Some(slot) = self.slots.get_mut(tier) {
            slot.parent = parent;
            slot.options.clear();
            slot.status = LoadStatus::Loading;
            slot.pending = Some(generation);
        }
    }

    /// Store a fetch result if `generation` is still the awaited one.
    ///
    /// Returns `false` when the result is stale and was dropped.
    pub fn complete(
        &mut self,
        tier: usize,
        generation: u64,
        result: std::result::Result<Vec<LookupOption>, String>,
    ) -> bool {
        let Some(slot) = self.slots.get_mut(tier) else {
            return false;
        };
        if slot.pending != Some(generation) {
            return false;
        }

        slot.pending = None;
        match result {
            Ok(options) => {
                slot.options = options;
                slot.status = LoadStatus::Loaded;
            }
            Err(message) => {
                slot.options.clear();
                slot.status = LoadStatus::Failed(message);
            }
        }
        true
    }

    /// Clear lists, statuses and pending fetches of `tier` and every tier below it.
    pub fn invalidate_from(&mut self, tier: usize) {
        for slot in self.slots.iter_mut().skip(tier) {
            slot.pending = None;
            if slot.fixed {
                continue;
            }
            slot.parent = None;
            slot.options.clear();
            slot.status = LoadStatus::Idle;
        }
    }

    pub fn options(&self, tier: usize) -> &[LookupOption] {
        self.slots
            .get(tier)
            .map(|s| s.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn status(&self, tier: usize) -> Option<&LoadStatus> {
        self.slots.get(tier).map(|s| &s.status)
    }

    pub fn parent(&self, tier: usize) -> Option<&Id> {
        self.slots.get(tier).and_then(|s| s.parent.as_ref())
    }

    pub fn pending(&self, tier: usize) -> Option<u64> {
        self.slots.get(tier).and_then(|s| s.pending)
    }

    pub fn find(&self, tier: usize, id: &Id) -> Option<&LookupOption> {
        self.options(tier).iter().find(|opt| &opt.id == id)
    }

    pub fn contains(&self, tier: usize, id: &Id) -> bool {
        self.find(tier, id).is_some()
    }
}

/// Independent lookup lists (provinces, cities, colors, features, ...).
#[derive(Debug, Clone, Default)]
pub struct FlatLookups {
    lists: BTreeMap<LookupKind, Vec<LookupOption>>,
}

impl FlatLookups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `kind` unless it is already cached.
    ///
    /// On failure the list is cached as empty and the error is returned, so
    /// the caller decides whether to surface it.
    pub async fn load<S: LookupSource + ?Sized>(
        &mut self,
        source: &S,
        kind: LookupKind,
    ) -> Result<&[LookupOption]> {
        if !self.lists.contains_key(&kind) {
            match source.fetch(kind, None).await {
                Ok(options) => {
                    self.lists.insert(kind, options);
                }
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "lookup list failed to load");
                    self.lists.insert(kind, Vec::new());
                    return Err(err);
                }
            }
        }
        Ok(self.get(kind))
    }

    /// Load every flat list, returning the failures.
    pub async fn load_all<S: LookupSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Vec<crate::error::CarlotError> {
        let mut failures = Vec::new();
        for kind in LookupKind::FLAT {
            if let Err(err) = self.load(source, kind).await {
                failures.push(err);
            }
        }
        failures
    }

    /// Drop a cached list so the next `load` refetches it.
    pub fn forget(&mut self, kind: LookupKind) {
        self.lists.remove(&kind);
    }

    pub fn get(&self, kind: LookupKind) -> &[LookupOption] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_loaded(&self, kind: LookupKind) -> bool {
        self.lists.contains_key(&kind)
    }

    pub fn name_of(&self, kind: LookupKind, id: &Id) -> Option<&str> {
        self.get(kind)
            .iter()
            .find(|opt| &opt.id == id)
            .map(|opt| opt.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookups;

    fn opts(names: &[&str]) -> Vec<LookupOption> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| LookupOption::new(i.to_string(), *n))
            .collect()
    }

    #[test]
    fn stale_generation_is_dropped() {
        let mut cache = LookupCache::new(2);
        cache.begin(1, Some(Id::from("1")), 3);
        cache.begin(1, Some(Id::from("2")), 4);

        assert!(!cache.complete(1, 3, Ok(opts(&["Corolla"]))));
        assert_eq!(cache.status(1), Some(&LoadStatus::Loading));

        assert!(cache.complete(1, 4, Ok(opts(&["Civic"]))));
        assert_eq!(cache.options(1)[0].name, "Civic");
        assert_eq!(cache.parent(1), Some(&Id::from("2")));
    }

    #[test]
    fn failure_leaves_empty_list() {
        let mut cache = LookupCache::new(1);
        cache.begin(0, None, 1);
        assert!(cache.complete(0, 1, Err("boom".into())));
        assert!(cache.options(0).is_empty());
        assert_eq!(cache.status(0), Some(&LoadStatus::Failed("boom".into())));
    }

    #[test]
    fn invalidation_keeps_fixed_domains() {
        let mut cache = LookupCache::new(3);
        cache.preload(0, opts(&["2024", "2023"]));
        cache.begin(1, None, 1);
        cache.complete(1, 1, Ok(opts(&["Toyota"])));
        cache.begin(2, Some(Id::from("0")), 2);

        cache.invalidate_from(0);

        assert_eq!(cache.options(0).len(), 2);
        assert_eq!(cache.status(0), Some(&LoadStatus::Loaded));
        assert!(cache.options(1).is_empty());
        assert_eq!(cache.status(1), Some(&LoadStatus::Idle));
        assert_eq!(cache.pending(2), None);
        assert!(!cache.complete(2, 2, Ok(opts(&["late"]))));
    }

    #[test]
    fn out_of_range_tiers_are_harmless() {
        let mut cache = LookupCache::new(1);
        cache.begin(5, None, 1);
        assert!(!cache.complete(5, 1, Ok(Vec::new())));
        assert!(cache.options(5).is_empty());
        assert_eq!(cache.status(5), None);
    }

    #[tokio::test]
    async fn flat_lists_load_once() {
        let src = StaticLookups::new().with(LookupKind::Cities, opts(&["Lahore", "Karachi"]));
        let mut flat = FlatLookups::new();

        assert_eq!(flat.load(&src, LookupKind::Cities).await.unwrap().len(), 2);
        flat.load(&src, LookupKind::Cities).await.unwrap();
        assert_eq!(src.calls(), 1);
        assert_eq!(flat.name_of(LookupKind::Cities, &Id::from("1")), Some("Karachi"));
    }

    #[tokio::test]
    async fn flat_failures_are_reported_and_cached_empty() {
        let src = StaticLookups::new();
        src.fail(LookupKind::Colors);
        let mut flat = FlatLookups::new();

        let failures = flat.load_all(&src).await;
        assert_eq!(failures.len(), 1);
        assert!(flat.is_loaded(LookupKind::Colors));
        assert!(flat.get(LookupKind::Colors).is_empty());

        src.recover(LookupKind::Colors);
        flat.forget(LookupKind::Colors);
        assert!(flat.load(&src, LookupKind::Colors).await.is_ok());
    }
}
