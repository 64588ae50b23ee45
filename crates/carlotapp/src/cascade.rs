//! # Cascade Selector
//!
//! Drives an N-tier dependent selection such as Year → Make → Model →
//! Version. Each tier's options depend on the choice made one tier above.
//!
//! ## Rules
//!
//! - Selecting tier `k` clears the selections and cached option lists of
//!   every tier below it, then dispatches the fetch for tier `k + 1`.
//! - Tier `k + 1` cannot be selected while tier `k` is empty.
//! - A failed fetch leaves the tier empty and unselectable until
//!   [`CascadeSelector::retry`] succeeds.
//!
//! ## Fetch Tickets
//!
//! The selector never performs I/O while holding state. A selection returns
//! a [`FetchTicket`] describing the request; the caller runs it against a
//! [`LookupSource`] and hands the result back to [`CascadeSelector::apply`].
//!
//! Every ticket carries a generation taken from a monotonically increasing
//! counter, and each tier remembers the one generation it is waiting for.
//! A result for any other generation is dropped as stale. The same check
//! covers a double click at one tier, a higher tier changing while a lower
//! fetch is in flight, and a reset. Dropping the selector drops the state
//! outright, so late results have nothing to land on.
//!
//! ```text
//! select(0, 2024) ──► ticket{tier 1, gen 1}
//! select(0, 2023) ──► ticket{tier 1, gen 2}   (tier 1 now awaits gen 2)
//! apply(gen 1)    ──► Stale
//! apply(gen 2)    ──► Applied
//! ```

use crate::error::{CarlotError, Result};
use crate::lookup::{LoadStatus, LookupCache, LookupSource};
use crate::model::{CascadeState, Id, LookupKind, LookupOption, TierSelection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierSource {
    /// Options known up front, e.g. model years.
    Static(Vec<LookupOption>),
    /// Options fetched from the backend, filtered by the tier above.
    Remote(LookupKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSpec {
    pub name: String,
    pub source: TierSource,
}

impl TierSpec {
    pub fn fixed(name: impl Into<String>, options: Vec<LookupOption>) -> Self {
        Self {
            name: name.into(),
            source: TierSource::Static(options),
        }
    }

    pub fn remote(name: impl Into<String>, kind: LookupKind) -> Self {
        Self {
            name: name.into(),
            source: TierSource::Remote(kind),
        }
    }
}

/// Year → Make → Model → Version, as used by the sell form.
pub fn vehicle_tiers(years: Vec<LookupOption>) -> Vec<TierSpec> {
    vec![
        TierSpec::fixed("year", years),
        TierSpec::remote("make", LookupKind::Makes),
        TierSpec::remote("model", LookupKind::Models),
        TierSpec::remote("version", LookupKind::Versions),
    ]
}

/// Make → Model → Version, as used by the comparison board.
pub fn model_tiers() -> Vec<TierSpec> {
    vec![
        TierSpec::remote("make", LookupKind::Makes),
        TierSpec::remote("model", LookupKind::Models),
        TierSpec::remote("version", LookupKind::Versions),
    ]
}

/// A fetch the caller must run and hand back to [`CascadeSelector::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub tier: usize,
    pub kind: LookupKind,
    pub parent: Option<Id>,
    pub generation: u64,
}

impl FetchTicket {
    pub async fn run<S: LookupSource + ?Sized>(&self, source: &S) -> Result<Vec<LookupOption>> {
        source.fetch(self.kind, self.parent.as_ref()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct CascadeSelector {
    specs: Vec<TierSpec>,
    selections: Vec<TierSelection>,
    cache: LookupCache,
    next_generation: u64,
}

impl CascadeSelector {
    pub fn new(specs: Vec<TierSpec>) -> Self {
        let mut cache = LookupCache::new(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if let TierSource::Static(options) = &spec.source {
                cache.preload(i, options.clone());
            }
        }
        let selections = specs
            .iter()
            .map(|s| TierSelection::empty(s.name.clone()))
            .collect();

        Self {
            specs,
            selections,
            cache,
            next_generation: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn tier_name(&self, index: usize) -> Option<&str> {
        self.specs.get(index).map(|s| s.name.as_str())
    }

    pub fn tier_index(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    pub fn selection(&self, index: usize) -> Option<&TierSelection> {
        self.selections.get(index)
    }

    pub fn selected_id(&self, index: usize) -> Option<&Id> {
        self.selection(index).and_then(|s| s.selected_id.as_ref())
    }

    pub fn options(&self, index: usize) -> &[LookupOption] {
        self.cache.options(index)
    }

    pub fn status(&self, index: usize) -> Option<&LoadStatus> {
        self.cache.status(index)
    }

    pub fn is_complete(&self) -> bool {
        !self.selections.is_empty() && self.selections.iter().all(TierSelection::is_selected)
    }

    pub fn is_loading(&self) -> bool {
        (0..self.len()).any(|i| self.cache.pending(i).is_some())
    }

    /// Snapshot of the selections, in the shape drafts persist.
    pub fn state(&self) -> CascadeState {
        CascadeState {
            tiers: self.selections.clone(),
        }
    }

    /// Dispatch the initial fetch when the first tier is remote.
    pub fn start(&mut self) -> Option<FetchTicket> {
        match self.specs.first().map(|s| &s.source) {
            Some(TierSource::Remote(_)) => self.dispatch(0, None),
            _ => None,
        }
    }

    pub fn select_tier(&mut self, index: usize, id: impl Into<Id>) -> Result<Option<FetchTicket>> {
        let id = id.into();
        if index >= self.len() {
            return Err(CarlotError::InvalidTier(index));
        }
        if self.selections[..index].iter().any(|s| !s.is_selected()) {
            return Err(CarlotError::TierSkipped(index));
        }
        if self.cache.status(index) != Some(&LoadStatus::Loaded) {
            return Err(CarlotError::TierNotLoaded(index));
        }
        let label = match self.cache.find(index, &id) {
            Some(option) => option.name.clone(),
            None => return Err(CarlotError::UnknownOption { tier: index, id }),
        };

        let selection = &mut self.selections[index];
        selection.selected_id = Some(id.clone());
        selection.selected_label = label;
        self.clear_below(index);

        Ok(self.dispatch(index + 1, Some(id)))
    }

    /// Accept a fetch result for `ticket`.
    ///
    /// Stale results are dropped and reported as [`FetchOutcome::Stale`].
    /// A current failure empties the tier and is returned as the error.
    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<LookupOption>>,
    ) -> Result<FetchOutcome> {
        if ticket.tier >= self.len() {
            return Err(CarlotError::InvalidTier(ticket.tier));
        }
        if self.cache.pending(ticket.tier) != Some(ticket.generation) {
            tracing::debug!(
                tier = ticket.tier,
                generation = ticket.generation,
                "dropping stale lookup result"
            );
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(options) => {
                self.cache.complete(ticket.tier, ticket.generation, Ok(options));
                self.drop_unavailable_selection(ticket.tier);
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                tracing::warn!(
                    tier = ticket.tier,
                    kind = %ticket.kind,
                    error = %err,
                    "lookup fetch failed"
                );
                self.cache
                    .complete(ticket.tier, ticket.generation, Err(err.to_string()));
                Err(err)
            }
        }
    }

    /// Run `ticket` against `source` and apply the result.
    pub async fn load<S: LookupSource + ?Sized>(
        &mut self,
        ticket: FetchTicket,
        source: &S,
    ) -> Result<FetchOutcome> {
        let result = ticket.run(source).await;
        self.apply(&ticket, result)
    }

    /// Select and immediately load the next tier's options.
    pub async fn select_and_load<S: LookupSource + ?Sized>(
        &mut self,
        index: usize,
        id: impl Into<Id>,
        source: &S,
    ) -> Result<()> {
        if let Some(ticket) = self.select_tier(index, id)? {
            self.load(ticket, source).await?;
        }
        Ok(())
    }

    /// Re-dispatch the fetch for a tier, typically after a failure.
    ///
    /// Returns `None` for tiers with a static domain.
    pub fn retry(&mut self, index: usize) -> Result<Option<FetchTicket>> {
        if index >= self.len() {
            return Err(CarlotError::InvalidTier(index));
        }
        let parent = match index {
            0 => None,
            _ => match self.selected_id(index - 1) {
                Some(id) => Some(id.clone()),
                None => return Err(CarlotError::TierSkipped(index)),
            },
        };
        Ok(self.dispatch(index, parent))
    }

    /// Replace the selections with a persisted snapshot.
    ///
    /// The snapshot must name the same tiers in the same order and may not
    /// have a gap. Returns the tickets that reload every option list the
    /// restored form needs to display.
    pub fn restore(&mut self, state: CascadeState) -> Result<Vec<FetchTicket>> {
        let names_match = state.tiers.len() == self.len()
            && state
                .tiers
                .iter()
                .zip(&self.specs)
                .all(|(t, s)| t.tier == s.name);
        if !names_match {
            return Err(CarlotError::InvalidDraft(
                "cascade tiers do not match this form".to_string(),
            ));
        }

        let first_gap = state
            .tiers
            .iter()
            .position(|t| !t.is_selected())
            .unwrap_or(state.tiers.len());
        if state.tiers[first_gap..].iter().any(TierSelection::is_selected) {
            return Err(CarlotError::InvalidDraft(
                "cascade selection has a gap".to_string(),
            ));
        }

        for (i, tier) in state.tiers.iter().enumerate() {
            let (TierSource::Static(_), Some(id)) = (&self.specs[i].source, &tier.selected_id)
            else {
                continue;
            };
            if !self.cache.contains(i, id) {
                return Err(CarlotError::InvalidDraft(format!(
                    "{} is not a valid {}",
                    id, tier.tier
                )));
            }
        }

        self.selections = state.tiers;
        self.cache.invalidate_from(0);

        let mut tickets = Vec::new();
        if let Some(ticket) = self.start() {
            tickets.push(ticket);
        }
        for index in 1..self.len() {
            let Some(parent) = self.selected_id(index - 1).cloned() else {
                break;
            };
            if let Some(ticket) = self.dispatch(index, Some(parent)) {
                tickets.push(ticket);
            }
        }
        Ok(tickets)
    }

    /// Clear every selection. Returns the initial fetch, if any.
    pub fn reset(&mut self) -> Option<FetchTicket> {
        for selection in &mut self.selections {
            selection.selected_id = None;
            selection.selected_label.clear();
        }
        self.cache.invalidate_from(0);
        self.start()
    }

    fn clear_below(&mut self, index: usize) {
        for selection in self.selections.iter_mut().skip(index + 1) {
            selection.selected_id = None;
            selection.selected_label.clear();
        }
        self.cache.invalidate_from(index + 1);
    }

    fn dispatch(&mut self, tier: usize, parent: Option<Id>) -> Option<FetchTicket> {
        let TierSource::Remote(kind) = self.specs.get(tier)?.source else {
            return None;
        };
        let generation = self.next_generation;
        self.next_generation += 1;
        self.cache.begin(tier, parent.clone(), generation);

        tracing::debug!(tier, generation, %kind, "dispatching lookup fetch");
        Some(FetchTicket {
            tier,
            kind,
            parent,
            generation,
        })
    }

    /// A restored selection the backend no longer offers is cleared, along
    /// with everything below it.
    fn drop_unavailable_selection(&mut self, tier: usize) {
        let Some(id) = self.selected_id(tier).cloned() else {
            return;
        };
        if self.cache.contains(tier, &id) {
            if let Some(option) = self.cache.find(tier, &id) {
                self.selections[tier].selected_label = option.name.clone();
            }
            return;
        }

        tracing::warn!(tier, id = %id, "restored selection is no longer offered");
        self.selections[tier].selected_id = None;
        self.selections[tier].selected_label.clear();
        self.clear_below(tier);
    }
}
